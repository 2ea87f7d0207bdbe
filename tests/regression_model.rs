use assert_approx_eq::assert_approx_eq;

use ferrite_tract::init::GaussianInitializer;
use ferrite_tract::model::ffnn_regression::PARAMS_FILE;
use ferrite_tract::{
    track, ActivationFunction, DwiVolumeManager, FfnnRegression, L2Distance, Loss, Matrix,
    TrackingConfig, UniformInitializer, Volume4D, VolumeManager,
};

const CHANNELS: usize = 6;

/// Smoothly varying synthetic signal so interpolation actually matters.
fn subject_volume(offset: f32) -> Volume4D {
    Volume4D::from_fn([5, 5, 5, CHANNELS], |x, y, z| {
        (0..CHANNELS)
            .map(|c| offset + (x as f32 * 0.3 + y as f32 * 0.1 - z as f32 * 0.2) * (c as f32 + 1.0) / 4.0)
            .collect()
    })
    .unwrap()
}

fn manager() -> DwiVolumeManager {
    let mut manager = DwiVolumeManager::new();
    manager.register(subject_volume(0.0)).unwrap();
    manager.register(subject_volume(1.0)).unwrap();
    manager
}

fn model(manager: &DwiVolumeManager) -> FfnnRegression<&DwiVolumeManager> {
    let mut model = FfnnRegression::new(manager, CHANNELS, vec![16, 8], 3, ActivationFunction::Tanh).unwrap();
    model.initialize(&mut GaussianInitializer::new(42, 0.5));
    model
}

fn coords() -> Matrix {
    Matrix::from_rows(vec![
        vec![1.2, 2.5, 0.7, 0.0],
        vec![3.9, 0.1, 2.2, 1.0],
        vec![2.0, 2.0, 2.0, 0.0],
    ])
    .unwrap()
}

#[test]
fn normalized_l2_samples_have_unit_norm() {
    let manager = manager();
    let model = model(&manager);
    let outputs = model.predict(&coords()).unwrap();
    let targets = Matrix::from_rows(vec![vec![1.0, 0.0, 0.0]; 3]).unwrap();

    let mut loss = L2Distance::with_eps(true, 1e-8);
    let losses = loss.compute_losses(&outputs, &targets).unwrap();
    assert_eq!(losses.len(), 3);

    for norm in loss.samples.as_ref().unwrap().row_norms() {
        assert_approx_eq!(norm, 1.0, 1e-6);
    }
    assert!(loss.updates().is_empty());
}

#[test]
fn sequence_generator_is_deterministic() {
    let manager = manager();
    let model = model(&manager);
    let generator = model.make_sequence_generator(1);

    let x_t = Matrix::from_rows(vec![vec![1.5, 1.5, 1.5], vec![0.2, 3.3, 4.0]]).unwrap();
    let (first, _) = generator(&x_t, vec![]).unwrap();
    let (second, _) = generator(&x_t, vec![]).unwrap();
    assert_eq!(first, second);

    // A different subject sees a different signal.
    let other = model.make_sequence_generator(0);
    let (third, _) = other(&x_t, vec![]).unwrap();
    assert_ne!(first, third);
}

#[test]
fn hyperparameters_and_parameters_rebuild_the_model() {
    let manager = manager();
    let original = model(&manager);

    let hyperparameters = original.hyperparameters();
    let json = serde_json::to_string(&hyperparameters).unwrap();
    let restored_hp = serde_json::from_str(&json).unwrap();

    let mut rebuilt = FfnnRegression::from_hyperparameters(&manager, &restored_hp).unwrap();
    rebuilt
        .set_parameters(original.parameters().into_iter().cloned().collect())
        .unwrap();

    assert_eq!(rebuilt.predict(&coords()).unwrap(), original.predict(&coords()).unwrap());
}

#[test]
fn checkpoint_round_trip() {
    let manager = manager();
    let original = model(&manager);

    let dir = std::env::temp_dir().join(format!("ferrite_tract_ckpt_{}", std::process::id()));
    original.save(&dir).unwrap();
    let loaded = FfnnRegression::load(&dir, &manager).unwrap();
    std::fs::remove_dir_all(&dir).ok();

    assert_eq!(loaded.hyperparameters(), original.hyperparameters());
    let (a, b) = (loaded.predict(&coords()).unwrap(), original.predict(&coords()).unwrap());
    for (ra, rb) in a.data.iter().zip(&b.data) {
        for (x, y) in ra.iter().zip(rb) {
            assert_approx_eq!(x, y, 1e-12);
        }
    }
}

#[test]
fn load_rejects_corrupt_parameters() {
    let manager = manager();
    let dir = std::env::temp_dir().join(format!("ferrite_tract_corrupt_ckpt_{}", std::process::id()));
    model(&manager).save(&dir).unwrap();
    let params_path = dir.join(PARAMS_FILE);
    let saved = std::fs::read_to_string(&params_path).unwrap();
    let params: serde_json::Value = serde_json::from_str(&saved).unwrap();

    let mut desynced = params.clone();
    desynced[0]["rows"] = serde_json::json!(CHANNELS + 1);
    let mut too_few = params.clone();
    too_few.as_array_mut().unwrap().pop();

    let cases = [
        ("truncated", saved[..saved.len() / 2].to_string()),
        ("desynced header", desynced.to_string()),
        ("missing matrix", too_few.to_string()),
    ];
    let mut accepted = vec![];
    for (name, text) in &cases {
        std::fs::write(&params_path, text).unwrap();
        if FfnnRegression::load(&dir, &manager).is_ok() {
            accepted.push(*name);
        }
    }
    std::fs::write(&params_path, &saved).unwrap();
    let intact = FfnnRegression::load(&dir, &manager).is_ok();
    std::fs::remove_dir_all(&dir).ok();

    assert!(accepted.is_empty(), "accepted {:?}", accepted);
    assert!(intact);
}

#[test]
fn default_initialization_is_reproducible() {
    let manager = manager();
    let mut a = FfnnRegression::new(&manager, CHANNELS, vec![4], 3, ActivationFunction::ReLU).unwrap();
    let mut b = FfnnRegression::new(&manager, CHANNELS, vec![4], 3, ActivationFunction::ReLU).unwrap();
    a.initialize_default();
    b.initialize(&mut UniformInitializer::new(1234));
    assert_eq!(a.parameters(), b.parameters());
}

#[test]
fn tracks_inside_the_volume() {
    let manager = manager();
    let model = model(&manager);
    assert_eq!(manager.data_dimension(), CHANNELS);

    let config = TrackingConfig {
        step_size: 0.5,
        max_steps: 20,
        bounds: Some([4.0, 4.0, 4.0]),
        ..Default::default()
    };
    let seeds = [[2.0, 2.0, 2.0], [1.0, 3.0, 2.5]];
    let streamlines = track(model.make_sequence_generator(0), &seeds, vec![], &config).unwrap();

    assert_eq!(streamlines.len(), 2);
    for (line, seed) in streamlines.iter().zip(&seeds) {
        assert_eq!(&line[0], seed);
        assert!(line.len() <= 21);
        for p in line {
            assert!(p.iter().all(|&x| (0.0..=4.0).contains(&x)));
        }
        for pair in line.windows(2) {
            let d: f64 = (0..3).map(|k| (pair[1][k] - pair[0][k]).powi(2)).sum::<f64>().sqrt();
            assert_approx_eq!(d, 0.5, 1e-9);
        }
    }
}
