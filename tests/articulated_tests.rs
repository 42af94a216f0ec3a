use approx::assert_relative_eq;
use manipulator_dynamics::utils::math::inertia_rod;
use manipulator_dynamics::{
    ArticulatedDynamics, DVec3, Dynamics, DynamicsConfig, DynamicsError, ForwardDynamicsMethod,
    JointType, Link, Multibody, SpatialInertia, Transform,
};

const G: f64 = 9.81;
const MASS: f64 = 2.0;
const LENGTH: f64 = 0.8;

/// Uniform rod hanging along -Y from a pivot about Z, gravity along -Y.
fn rod_pendulum() -> Multibody {
    let mut mb = Multibody::new();
    let rod = SpatialInertia::new(
        MASS,
        DVec3::new(0.0, -LENGTH / 2.0, 0.0),
        inertia_rod(MASS, LENGTH, DVec3::Y),
    );
    mb.add_link(Link::new("rod", None, JointType::Revolute { axis: DVec3::Z }).with_inertia(rod))
        .unwrap();
    mb
}

fn pendulum_config(method: ForwardDynamicsMethod) -> DynamicsConfig {
    DynamicsConfig::default()
        .with_gravity([0.0, -G, 0.0])
        .with_method(method)
}

fn point_mass_double_pendulum() -> Multibody {
    let mut mb = Multibody::new();
    mb.add_link(
        Link::new("upper", None, JointType::Revolute { axis: DVec3::Z })
            .with_inertia(SpatialInertia::point_mass(1.0, DVec3::new(1.0, 0.0, 0.0))),
    )
    .unwrap();
    mb.add_link(
        Link::new("lower", Some(0), JointType::Revolute { axis: DVec3::Z })
            .with_parent_to_joint(Transform::from_translation(DVec3::X))
            .with_inertia(SpatialInertia::point_mass(0.5, DVec3::new(0.7, 0.0, 0.0))),
    )
    .unwrap();
    mb
}

#[test]
fn test_rod_pendulum_matches_closed_form() {
    for method in [ForwardDynamicsMethod::Crba, ForwardDynamicsMethod::Aba] {
        let model = ArticulatedDynamics::new(rod_pendulum(), pendulum_config(method)).unwrap();
        assert_eq!(model.state_dim(), 2);
        assert_eq!(model.control_dim(), 1);

        for theta in [0.0, 0.3, -1.2, 2.5] {
            let xdot = model.derivatives(&[theta, 0.7], &[0.0]).unwrap();
            assert_eq!(xdot[0], 0.7);
            assert_relative_eq!(
                xdot[1],
                -1.5 * G / LENGTH * theta.sin(),
                epsilon = 1e-10
            );
        }
    }
}

#[test]
fn test_rod_pendulum_torque_response() {
    let model = ArticulatedDynamics::new(
        rod_pendulum(),
        pendulum_config(ForwardDynamicsMethod::Crba),
    )
    .unwrap();
    let pivot_inertia = MASS * LENGTH * LENGTH / 3.0;

    let xdot = model.derivatives(&[0.0, 0.0], &[1.5]).unwrap();
    assert_relative_eq!(xdot[1], 1.5 / pivot_inertia, epsilon = 1e-10);

    let mass = model.mass_matrix(&[0.4]).unwrap();
    assert_relative_eq!(mass[(0, 0)], pivot_inertia, epsilon = 1e-12);
}

#[test]
fn test_rod_pendulum_linearization() {
    let model = ArticulatedDynamics::new(
        rod_pendulum(),
        pendulum_config(ForwardDynamicsMethod::Crba),
    )
    .unwrap();
    let theta = 0.6;
    let lin = model.linearize(&[theta, 0.0], &[0.0]).unwrap();

    assert_relative_eq!(lin.jac_x[(0, 0)], 0.0, epsilon = 1e-8);
    assert_relative_eq!(lin.jac_x[(0, 1)], 1.0, epsilon = 1e-8);
    assert_relative_eq!(
        lin.jac_x[(1, 0)],
        -1.5 * G / LENGTH * theta.cos(),
        epsilon = 1e-5
    );
    assert_relative_eq!(lin.jac_x[(1, 1)], 0.0, epsilon = 1e-8);
    assert_relative_eq!(lin.jac_u[(0, 0)], 0.0, epsilon = 1e-8);
    assert_relative_eq!(
        lin.jac_u[(1, 0)],
        3.0 / (MASS * LENGTH * LENGTH),
        epsilon = 1e-6
    );
}

#[test]
fn test_double_pendulum_solvers_agree() {
    let crba = ArticulatedDynamics::new(
        point_mass_double_pendulum(),
        pendulum_config(ForwardDynamicsMethod::Crba),
    )
    .unwrap();
    let aba = ArticulatedDynamics::new(
        point_mass_double_pendulum(),
        pendulum_config(ForwardDynamicsMethod::Aba),
    )
    .unwrap();

    let x = [0.3, -0.9, 1.1, -0.4];
    let u = [0.25, -0.1];
    let a = crba.derivatives(&x, &u).unwrap();
    let b = aba.derivatives(&x, &u).unwrap();
    for (a, b) in a.iter().zip(&b) {
        assert_relative_eq!(*a, *b, epsilon = 1e-10);
    }
}

#[test]
fn test_inverse_dynamics_round_trip() {
    let model = ArticulatedDynamics::new(
        point_mass_double_pendulum(),
        pendulum_config(ForwardDynamicsMethod::Crba),
    )
    .unwrap();
    let (q, qd, tau) = ([0.5, 0.2], [-0.3, 0.8], [0.4, -0.6]);

    let qdd = model.forward_dynamics(&q, &qd, &tau).unwrap();
    let recovered = model.inverse_dynamics(&q, &qd, qdd.as_slice()).unwrap();
    for (a, b) in recovered.iter().zip(&tau) {
        assert_relative_eq!(*a, *b, epsilon = 1e-10);
    }
}

#[test]
fn test_fixed_mount_adds_no_coordinates() {
    let mut mb = rod_pendulum();
    mb.add_link(
        Link::new("tip", Some(0), JointType::Fixed)
            .with_parent_to_joint(Transform::from_translation(DVec3::new(0.0, -LENGTH, 0.0)))
            .with_inertia(SpatialInertia::point_mass(0.5, DVec3::ZERO)),
    )
    .unwrap();
    let model =
        ArticulatedDynamics::new(mb, pendulum_config(ForwardDynamicsMethod::Aba)).unwrap();
    assert_eq!(model.dofs(), 1);

    // Rod plus a tip mass at the end of the rod.
    let pivot_inertia = MASS * LENGTH * LENGTH / 3.0 + 0.5 * LENGTH * LENGTH;
    let xdot = model.derivatives(&[0.0, 0.0], &[1.0]).unwrap();
    assert_relative_eq!(xdot[1], 1.0 / pivot_inertia, epsilon = 1e-10);
}

#[test]
fn test_massless_link_is_singular() {
    let mut mb = Multibody::new();
    mb.add_link(Link::new("ghost", None, JointType::Revolute { axis: DVec3::Z }))
        .unwrap();

    for method in [ForwardDynamicsMethod::Crba, ForwardDynamicsMethod::Aba] {
        let model = ArticulatedDynamics::new(mb.clone(), pendulum_config(method)).unwrap();
        let mut xdot = [7.0, 7.0];
        let err = model
            .compute_derivatives(&[0.0, 0.0], &[1.0], &mut xdot)
            .unwrap_err();
        assert!(err.is_singularity(), "{method:?}: {err}");
        assert_eq!(xdot, [7.0, 7.0]);
    }
}

#[test]
fn test_invalid_models_are_rejected() {
    let mut mb = rod_pendulum();
    mb.links[0].inertia.mass = -1.0;
    let err = ArticulatedDynamics::new(mb, DynamicsConfig::default()).unwrap_err();
    assert!(matches!(err, DynamicsError::InvalidModel { .. }));

    let config = DynamicsConfig::default().with_gravity([0.0, f64::NAN, 0.0]);
    let err = ArticulatedDynamics::new(rod_pendulum(), config).unwrap_err();
    assert!(matches!(err, DynamicsError::InvalidModel { .. }));

    let config = DynamicsConfig {
        singularity_tolerance: -1.0,
        ..DynamicsConfig::default()
    };
    let err = ArticulatedDynamics::new(rod_pendulum(), config).unwrap_err();
    assert!(matches!(err, DynamicsError::InvalidModel { .. }));
}

#[test]
fn test_joint_vector_lengths_are_checked() {
    let model = ArticulatedDynamics::new(
        point_mass_double_pendulum(),
        pendulum_config(ForwardDynamicsMethod::Crba),
    )
    .unwrap();
    assert!(matches!(
        model.mass_matrix(&[0.0]),
        Err(DynamicsError::DimensionMismatch {
            expected: 2,
            actual: 1,
            ..
        })
    ));
    assert!(matches!(
        model.gravity_torques(&[0.0, f64::INFINITY]),
        Err(DynamicsError::NonFiniteInput { index: 1, .. })
    ));
}

#[test]
fn test_models_are_usable_through_trait_objects() {
    let models: Vec<Box<dyn Dynamics>> = vec![
        Box::new(
            ArticulatedDynamics::new(
                rod_pendulum(),
                pendulum_config(ForwardDynamicsMethod::Crba),
            )
            .unwrap(),
        ),
        Box::new(
            ArticulatedDynamics::new(
                point_mass_double_pendulum(),
                pendulum_config(ForwardDynamicsMethod::Aba),
            )
            .unwrap(),
        ),
    ];

    for model in &models {
        let x = vec![0.1; model.state_dim()];
        let u = vec![0.0; model.control_dim()];
        let mut xdot = vec![0.0; model.state_dim()];
        model.compute_derivatives(&x, &u, &mut xdot).unwrap();
        let half = model.state_dim() / 2;
        assert_eq!(&xdot[..half], &x[half..]);
    }
}

#[test]
fn test_small_scale_pendulum_solves_with_both_methods() {
    // 10 mg, 1 cm rod swinging in a horizontal plane (default gravity is along -Z).
    let (mass, length) = (1e-5, 0.01);
    let mut mb = Multibody::new();
    mb.add_link(
        Link::new("rod", None, JointType::Revolute { axis: DVec3::Z }).with_inertia(
            SpatialInertia::new(
                mass,
                DVec3::new(0.0, -length / 2.0, 0.0),
                inertia_rod(mass, length, DVec3::Y),
            ),
        ),
    )
    .unwrap();
    let pivot_inertia = mass * length * length / 3.0;

    for method in [ForwardDynamicsMethod::Crba, ForwardDynamicsMethod::Aba] {
        let config = DynamicsConfig::default().with_method(method);
        let model = ArticulatedDynamics::new(mb.clone(), config).unwrap();
        let xdot = model.derivatives(&[0.3, 0.0], &[1e-9]).unwrap();
        assert_relative_eq!(xdot[1], 1e-9 / pivot_inertia, max_relative = 1e-9);
    }
}

#[test]
fn test_singularity_tolerance_applies_to_articulated_body_solver() {
    let config = DynamicsConfig {
        singularity_tolerance: 1.0,
        ..pendulum_config(ForwardDynamicsMethod::Aba)
    };
    let model = ArticulatedDynamics::new(point_mass_double_pendulum(), config).unwrap();
    let mut xdot = [7.0; 4];
    let err = model
        .compute_derivatives(&[0.3, -0.9, 1.1, -0.4], &[0.25, -0.1], &mut xdot)
        .unwrap_err();
    assert!(err.is_singularity(), "{err}");
    assert_eq!(xdot, [7.0; 4]);
}

#[test]
fn test_ill_conditioned_mass_matrix_is_singular() {
    let mut mb = Multibody::new();
    mb.add_link(
        Link::new("upper", None, JointType::Revolute { axis: DVec3::Z })
            .with_inertia(SpatialInertia::point_mass(1.0, DVec3::new(1.0, 0.0, 0.0))),
    )
    .unwrap();
    mb.add_link(
        Link::new("lower", Some(0), JointType::Revolute { axis: DVec3::Z })
            .with_parent_to_joint(Transform::from_translation(DVec3::X))
            .with_inertia(SpatialInertia::point_mass(1e-14, DVec3::new(0.7, 0.0, 0.0))),
    )
    .unwrap();
    let model =
        ArticulatedDynamics::new(mb.clone(), pendulum_config(ForwardDynamicsMethod::Crba))
            .unwrap();

    // Still positive definite, only badly conditioned.
    assert!(model.mass_matrix(&[0.2, 0.4]).unwrap().cholesky().is_some());

    let mut xdot = [7.0; 4];
    let err = model
        .compute_derivatives(&[0.2, 0.4, 0.0, 0.0], &[0.0, 0.0], &mut xdot)
        .unwrap_err();
    assert!(err.is_singularity(), "{err}");
    assert_eq!(xdot, [7.0; 4]);

    let relaxed = DynamicsConfig {
        singularity_tolerance: 0.0,
        ..pendulum_config(ForwardDynamicsMethod::Crba)
    };
    let model = ArticulatedDynamics::new(mb, relaxed).unwrap();
    assert!(model
        .compute_derivatives(&[0.2, 0.4, 0.0, 0.0], &[0.0, 0.0], &mut xdot)
        .is_ok());
}
