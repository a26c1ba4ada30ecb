//! Tests for the fixed-length optimisation loop

#[cfg(test)]
mod tests {
    use crate::unit::support::{SIZE, backbone, pattern_tensor};
    use renaissance::TransferError;
    use renaissance::loss::objective::{LossWeights, StyleObjective};
    use renaissance::loss::targets::ReferenceActivations;
    use renaissance::network::backbone::Backbone;
    use renaissance::network::dream::{DreamInit, DreamLayer};
    use renaissance::network::taps::LayerTaps;
    use renaissance::training::trainer::{
        LossSample, Trainer, TrainerConfig, TrainerState, TrainingObserver,
    };
    use tch::Device;

    #[derive(Default)]
    struct Recorder {
        steps: Vec<(usize, usize)>,
        logs: Vec<usize>,
    }

    impl TrainingObserver for Recorder {
        fn on_step(&mut self, completed: usize, total: usize) {
            self.steps.push((completed, total));
        }

        fn on_log(&mut self, sample: &LossSample) {
            self.logs.push(sample.step);
        }
    }

    fn config(iterations: usize, log_every: usize) -> TrainerConfig {
        TrainerConfig {
            iterations,
            learning_rate: 2.0,
            log_every,
            ..TrainerConfig::default()
        }
    }

    fn setup(net: &Backbone) -> (LayerTaps, StyleObjective, DreamLayer) {
        let taps = LayerTaps::vgg19();
        let content = pattern_tensor(SIZE, 0);
        let targets =
            ReferenceActivations::compute(net, &taps, &content, &pattern_tensor(SIZE, 9)).unwrap();
        let objective = StyleObjective::new(targets, LossWeights::for_taps(&taps)).unwrap();
        let dream = DreamLayer::new(&content, DreamInit::Content, Device::Cpu);
        (taps, objective, dream)
    }

    // Tests the defaults carry the documented optimizer settings
    // Verified by changing the default momentum
    #[test]
    fn test_default_config() {
        let config = TrainerConfig::default();

        assert_eq!(config.iterations, 500);
        assert!((config.learning_rate - 10.0).abs() < f64::EPSILON);
        assert!((config.beta1 - 0.95).abs() < f64::EPSILON);
        assert_eq!(config.log_every, 100);
        assert!(config.validate().is_ok());
    }

    // Tests unusable hyperparameters are rejected
    // Verified by removing each check in turn
    #[test]
    fn test_config_validation() {
        let base = TrainerConfig::default();
        let bad = [
            TrainerConfig {
                iterations: 0,
                ..base
            },
            TrainerConfig {
                log_every: 0,
                ..base
            },
            TrainerConfig {
                learning_rate: 0.0,
                ..base
            },
            TrainerConfig {
                learning_rate: f64::NAN,
                ..base
            },
            TrainerConfig { beta1: 1.0, ..base },
            TrainerConfig {
                beta2: -0.1,
                ..base
            },
        ];

        for config in bad {
            assert!(
                matches!(
                    config.validate(),
                    Err(TransferError::InvalidParameter { .. })
                ),
                "{config:?} should be rejected"
            );
        }
    }

    // Tests the trainer moves from Initialized to Stopped and logs on multiples of log_every
    // Verified by logging on the step after the multiple
    #[test]
    fn test_run_logs_and_stops() {
        let net = backbone();
        let (taps, objective, dream) = setup(&net);
        let mut trainer = Trainer::new(config(5, 2), &dream).unwrap();
        let mut recorder = Recorder::default();

        assert_eq!(trainer.state(), TrainerState::Initialized);
        let report = trainer
            .run(&net, &taps, &objective, &dream, &mut recorder)
            .unwrap();

        assert_eq!(trainer.state(), TrainerState::Stopped);
        assert_eq!(report.iterations, 5);
        let logged: Vec<_> = report.logged.iter().map(|s| s.step).collect();
        assert_eq!(logged, vec![0, 2, 4]);
        assert_eq!(recorder.logs, vec![0, 2, 4]);
        assert_eq!(
            recorder.steps,
            vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]
        );
        assert!(report.final_loss.is_finite());
    }

    // Tests the optimised image scores a lower loss than the starting image
    // Verified by setting the learning rate to a tiny value
    #[test]
    fn test_loss_decreases() {
        let net = backbone();
        let (taps, objective, dream) = setup(&net);
        let mut trainer = Trainer::new(config(12, 1), &dream).unwrap();

        let report = trainer.run(&net, &taps, &objective, &dream, &mut ()).unwrap();

        let first = report.logged.first().unwrap().total;
        assert!(first > 0.0);
        assert!(report.final_loss < first, "{} !< {first}", report.final_loss);
    }

    // Tests only the dream image changes during training
    // Verified by building the optimizer over the backbone store
    #[test]
    fn test_backbone_is_untouched() {
        let net = backbone();
        let (taps, objective, dream) = setup(&net);
        let probe = pattern_tensor(SIZE, 3).to_network_input(Device::Cpu);
        let before = net.forward_taps(&probe, &taps).unwrap().content;
        let start = dream.image().detach().copy();

        let mut trainer = Trainer::new(config(3, 1), &dream).unwrap();
        trainer.run(&net, &taps, &objective, &dream, &mut ()).unwrap();

        let after = net.forward_taps(&probe, &taps).unwrap().content;
        let network_drift = (&before - &after).abs().max().double_value(&[]);
        let image_drift = (dream.image().detach() - start).abs().max().double_value(&[]);
        assert!(network_drift < 1e-6);
        assert!(image_drift > 0.0);
        assert_eq!(net.trainable_variable_count(), 0);
    }

    // Tests a trainer refuses a second run
    // Verified by resetting the state at the end of a run
    #[test]
    fn test_second_run_is_rejected() {
        let net = backbone();
        let (taps, objective, dream) = setup(&net);
        let mut trainer = Trainer::new(config(1, 1), &dream).unwrap();

        trainer.run(&net, &taps, &objective, &dream, &mut ()).unwrap();
        let second = trainer.run(&net, &taps, &objective, &dream, &mut ());

        assert!(matches!(
            second,
            Err(TransferError::InvalidParameter { .. })
        ));
        assert_eq!(trainer.state(), TrainerState::Stopped);
    }

    // Tests invalid settings fail before an optimizer is built
    // Verified by skipping validation in the constructor
    #[test]
    fn test_new_validates() {
        let content = pattern_tensor(SIZE, 0);
        let dream = DreamLayer::new(&content, DreamInit::Content, Device::Cpu);

        assert!(Trainer::new(config(0, 1), &dream).is_err());
    }
}
