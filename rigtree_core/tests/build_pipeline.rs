// End-to-end tests: description text -> parsed tables -> tree -> scene
use approx::assert_relative_eq;
use glam::{Quat, Vec3};
use rigtree_core::{
    convert_rotation, Diagnostic, DiagnosticKind, DescriptionParser, JointIndexRegistry,
    KinematicTreeBuilder, PathOnlyResolver, Rgba, RigConfig, RigError, RobotLoader,
};

const MINI_HUMANOID: &str = include_str!("data/mini_humanoid.urdf");

const EPS: f32 = 1e-5;

fn parse(xml: &str) -> rigtree_core::ParsedDescription {
    let registry = JointIndexRegistry::humanoid();
    DescriptionParser::new(&registry).parse(xml).unwrap()
}

/// Tree-shaped description with `n` links and `n - 1` joints
fn synthetic_tree(n: usize) -> String {
    let mut xml = String::from("<robot name=\"synthetic\">\n");
    for i in 0..n {
        xml.push_str(&format!("  <link name=\"link_{}\"/>\n", i));
    }
    for i in 1..n {
        // deterministic but irregular branching
        let parent = (i * 31 + 7) % i;
        let kind = if i % 3 == 0 { "fixed" } else { "revolute" };
        xml.push_str(&format!(
            "  <joint name=\"j{i}_joint\" type=\"{kind}\">\n    \
               <origin xyz=\"0 0 0.1\" rpy=\"0 0 0.05\"/>\n    \
               <parent link=\"link_{parent}\"/>\n    \
               <child link=\"link_{i}\"/>\n    \
               <axis xyz=\"0 1 0\"/>\n  \
             </joint>\n"
        ));
    }
    xml.push_str("</robot>\n");
    xml
}

#[test]
fn test_mini_humanoid_counts() {
    let parsed = parse(MINI_HUMANOID);
    assert_eq!(parsed.robot_name.as_deref(), Some("mini_humanoid"));
    assert_eq!(parsed.links.len(), 8);
    assert_eq!(parsed.joints.len(), 7);
    assert_eq!(parsed.materials.len(), 2);

    let output = KinematicTreeBuilder::new(&parsed, &PathOnlyResolver)
        .build("pelvis")
        .unwrap();
    assert_eq!(output.tree.link_count(), 8);
    assert_eq!(output.tree.joint_count(), 7);
    assert!(output.diagnostics.is_empty());

    let indices: Vec<i32> = output.revolute_joints.mapped().map(|(i, _)| i).collect();
    assert_eq!(indices, vec![0, 1, 3, 6, 12, 15]);
}

#[test]
fn test_only_non_actuated_joint_is_unmapped() {
    let parsed = parse(MINI_HUMANOID);
    let unmapped: Vec<&Diagnostic> = parsed
        .diagnostics
        .of_kind(DiagnosticKind::UnmappedJoint)
        .collect();
    assert_eq!(unmapped.len(), 1);
    assert!(matches!(
        unmapped[0],
        Diagnostic::UnmappedJoint { joint, canonical }
            if joint == "imu_in_torso_joint" && canonical == "ImuInTorso"
    ));
}

#[test]
fn test_depth_first_order() {
    let parsed = parse(MINI_HUMANOID);
    let output = KinematicTreeBuilder::new(&parsed, &PathOnlyResolver)
        .build("pelvis")
        .unwrap();
    let tree = &output.tree;

    let names: Vec<&str> = tree
        .depth_first()
        .into_iter()
        .map(|id| tree.node(id).unwrap().name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "pelvis",
            "left_hip_pitch_joint",
            "left_hip_pitch_link",
            "left_hip_roll_joint",
            "left_hip_roll_link",
            "left_knee_joint",
            "left_knee_link",
            "right_hip_pitch_joint",
            "right_hip_pitch_link",
            "waist_yaw_joint",
            "torso_link",
            "imu_in_torso_joint",
            "imu_in_torso",
            "left_shoulder_pitch_joint",
            "left_shoulder_pitch_link",
        ]
    );
}

#[test]
fn test_leg_chain_world_position() {
    let parsed = parse(MINI_HUMANOID);
    let output = KinematicTreeBuilder::new(&parsed, &PathOnlyResolver)
        .build("pelvis")
        .unwrap();

    // revolute rest poses keep only yaw, which is zero along this chain
    let knee = output.tree.find_link("left_knee_link").unwrap();
    let world = output.tree.world_transform(knee).unwrap();
    let expected = Vec3::new(
        0.064452 + 0.052 + 0.0021489,
        -0.1027 - 0.030465 - 0.17734,
        -0.078273,
    );
    assert!(world.translation.abs_diff_eq(expected, EPS));
    assert!(world.rotation.abs_diff_eq(Quat::IDENTITY, EPS));
}

#[test]
fn test_shoulder_rest_orientation_keeps_only_yaw() {
    let parsed = parse(MINI_HUMANOID);
    let output = KinematicTreeBuilder::new(&parsed, &PathOnlyResolver)
        .build("pelvis")
        .unwrap();

    let shoulder = output.revolute_joints.get(15).unwrap();
    let expected = convert_rotation(Vec3::new(0.0, 0.0, -0.00019159));
    assert!(shoulder.rest_orientation.abs_diff_eq(expected, EPS));
    assert_eq!(shoulder.axis, Vec3::X);

    let fixed = output.tree.find_joint("imu_in_torso_joint").unwrap();
    assert_eq!(output.tree.node(fixed).unwrap().joint_index(), None);
}

#[test]
fn test_limits_and_materials() {
    let parsed = parse(MINI_HUMANOID);

    let knee = parsed.joint("left_knee_joint").unwrap();
    assert_relative_eq!(knee.limit("lower").unwrap(), -0.087267, epsilon = EPS);
    assert_relative_eq!(knee.limit("effort").unwrap(), 139.0, epsilon = EPS);

    let hip_visual = &parsed.link("left_hip_pitch_link").unwrap().visuals[0];
    assert_eq!(
        hip_visual.mesh_path.as_deref(),
        Some("left_hip_pitch_link.glb")
    );
    assert_eq!(
        hip_visual.material.as_ref().unwrap().color,
        Rgba::new(0.7, 0.7, 0.7, 1.0)
    );

    let pelvis = parsed.link("pelvis").unwrap();
    assert_relative_eq!(pelvis.mass().unwrap(), 3.813, epsilon = EPS);
    assert_relative_eq!(pelvis.inertial["ixz"], 2.1e-6, epsilon = 1e-9);
}

#[test]
fn test_synthetic_trees_have_expected_node_counts() {
    for n in [1, 2, 3, 10, 57] {
        let parsed = parse(&synthetic_tree(n));
        let output = KinematicTreeBuilder::new(&parsed, &PathOnlyResolver)
            .build("link_0")
            .unwrap();
        assert_eq!(output.tree.link_count(), n, "links for n = {}", n);
        assert_eq!(output.tree.joint_count(), n - 1, "joints for n = {}", n);
        assert!(output
            .diagnostics
            .of_kind(DiagnosticKind::MissingReference)
            .next()
            .is_none());
    }
}

#[test]
fn test_missing_child_link_does_not_fail_the_build() {
    let parsed = parse(
        r#"<robot>
            <link name="pelvis"/>
            <joint name="left_hip_pitch_joint" type="revolute">
                <parent link="pelvis"/><child link="nowhere"/><axis xyz="0 1 0"/>
            </joint>
            <joint name="right_hip_pitch_joint" type="revolute">
                <parent link="pelvis"/><child link="also_nowhere"/><axis xyz="0 1 0"/>
            </joint>
        </robot>"#,
    );
    let output = KinematicTreeBuilder::new(&parsed, &PathOnlyResolver)
        .build("pelvis")
        .unwrap();

    assert_eq!(output.tree.link_count(), 1);
    assert_eq!(output.tree.joint_count(), 2);
    for joint in output.tree.children(output.tree.root().unwrap()) {
        assert!(output.tree.children(*joint).is_empty());
    }
    assert_eq!(output.revolute_joints.mapped().count(), 2);
    assert_eq!(output.diagnostics.count(DiagnosticKind::MissingReference), 2);
}

#[test]
fn test_loader_with_partial_mesh_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("pelvis.glb"), b"glTF").unwrap();
    let urdf_path = dir.path().join("mini_humanoid.urdf");
    std::fs::write(&urdf_path, MINI_HUMANOID).unwrap();

    let config = RigConfig {
        mesh_base_path: dir.path().to_path_buf(),
        ..RigConfig::default()
    };
    let scene = RobotLoader::new(config)
        .unwrap()
        .load_file(&urdf_path)
        .unwrap();

    assert_eq!(
        scene.diagnostics.count(DiagnosticKind::UnresolvedResource),
        2
    );
    let pelvis = scene.tree.node(scene.root_link().unwrap()).unwrap();
    assert_eq!(pelvis.visuals().len(), 1);
    assert_eq!(pelvis.collisions().len(), 1);

    let torso = scene.tree.node(scene.tree.find_link("torso_link").unwrap()).unwrap();
    assert!(torso.visuals().is_empty());
}

#[test]
fn test_actuating_the_knee_moves_the_foot_chain() {
    let loader = RobotLoader::new(RigConfig::default())
        .unwrap()
        .with_resolver(PathOnlyResolver);
    let mut scene = loader.load_str(MINI_HUMANOID).unwrap();

    let knee_link = scene.tree.find_link("left_knee_link").unwrap();
    let before = scene.world_transform(knee_link).unwrap();

    assert!(scene.set_joint_angle(1, 0.5));
    let after = scene.world_transform(knee_link).unwrap();

    assert!(!after.abs_diff_eq(&before, 1e-4));
    assert!(!scene.set_joint_angle(40, 0.5));
}

#[test]
fn test_truncated_document_is_malformed() {
    let truncated = &MINI_HUMANOID[..MINI_HUMANOID.len() / 2];
    let registry = JointIndexRegistry::humanoid();
    let result = DescriptionParser::new(&registry).parse(truncated);
    assert!(matches!(result, Err(RigError::MalformedDocument(_))));
}
