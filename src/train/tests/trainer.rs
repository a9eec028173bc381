use std::cell::RefCell;
use std::path::{Path, PathBuf};

use approx::assert_abs_diff_eq;
use ndarray::Array3;

use crate::assert_err;
use crate::data::{DataError, SegmentationBatch, Transform};
use crate::tensor::Tensor;
use crate::train::{
    OptimizerConfig, SampleSource, SegmentationModel, TrainError, Trainer, TrainerConfig,
};

/// 记录所有调用的假模型，损失取批次标签之和
#[derive(Default)]
struct RecordingModel {
    optimizers: Vec<OptimizerConfig>,
    seen_labels: Vec<i64>,
    saved: RefCell<Vec<PathBuf>>,
}

impl SegmentationModel for RecordingModel {
    fn configure_optimizer(&mut self, optimizer: &OptimizerConfig) -> Result<(), TrainError> {
        self.optimizers.push(*optimizer);
        Ok(())
    }

    fn train_step(
        &mut self,
        images: &Tensor,
        labels: &Array3<i64>,
        class_weights: &Tensor,
    ) -> Result<f32, TrainError> {
        assert_eq!(images.shape()[0], labels.dim().0);
        assert_eq!(class_weights.shape(), &[2]);
        self.seen_labels.push(labels[[0, 0, 0]]);
        Ok(labels.sum() as f32)
    }

    fn save_checkpoint(&self, path: &Path) -> Result<(), TrainError> {
        self.saved.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

/// 第`i`个样本的标签全为`i`；`fail_at`处取样失败
struct InMemorySource {
    len: usize,
    fail_at: Option<usize>,
}

impl SampleSource for InMemorySource {
    fn len(&self) -> usize {
        self.len
    }

    fn get_item(&self, index: usize) -> Result<SegmentationBatch, DataError> {
        if Some(index) == self.fail_at {
            return Err(DataError::FileNotFound(PathBuf::from(format!("{index}.png"))));
        }
        Ok(SegmentationBatch {
            images: Tensor::zeros(&[1, 3, 2, 2]),
            labels: Array3::from_elem((1, 2, 2), index as i64),
            transforms: vec![Transform::Identity],
        })
    }

    fn num_classes(&self) -> usize {
        2
    }

    fn class_weights(&self) -> Tensor {
        Tensor::full(1., &[2])
    }
}

fn config(dir: &Path) -> TrainerConfig {
    TrainerConfig {
        epochs: 5,
        lr_decay_every: 2,
        checkpoint_dir: dir.to_path_buf(),
        ..TrainerConfig::default()
    }
}

#[test]
fn test_default_config() {
    let config = TrainerConfig::default();
    assert_eq!(config.epochs, 25);
    assert_eq!(config.learning_rate, 1e-4);
    assert_eq!(config.momentum, 0.9);
    assert_eq!(config.weight_decay, 2e-5);
    assert_eq!(config.lr_decay_every, 25);
    assert_eq!(config.lr_decay_factor, 5.0);

    let trainer = Trainer::new(config).unwrap();
    assert_eq!(trainer.checkpoint_path(25), PathBuf::from("saves/gcn-25.pth"));
    assert_eq!(trainer.final_checkpoint_path(), PathBuf::from("saves/gcn-final.pth"));

    let parsed: TrainerConfig = serde_json::from_str(r#"{ "epochs": 3, "shuffle": true }"#).unwrap();
    assert_eq!(parsed.epochs, 3);
    assert!(parsed.shuffle);
    assert_eq!(parsed.checkpoint_template, "gcn-{epoch}.pth");
}

#[test]
fn test_lr_decay_and_checkpoint_schedule() {
    let tmp = tempfile::tempdir().unwrap();
    let trainer = Trainer::new(config(tmp.path())).unwrap();
    let mut model = RecordingModel::default();
    let source = InMemorySource { len: 3, fail_at: None };

    let report = trainer.fit(&mut model, &source).unwrap();

    // 初始一次 + 第2、4轮各一次
    let rates = model.optimizers.iter().map(|o| o.learning_rate).collect::<Vec<_>>();
    assert_eq!(rates.len(), 3);
    assert_abs_diff_eq!(rates[0], 1e-4);
    assert_abs_diff_eq!(rates[1], 2e-5, epsilon = 1e-10);
    assert_abs_diff_eq!(rates[2], 4e-6, epsilon = 1e-10);
    assert!(model.optimizers.iter().all(|o| o.momentum == 0.9 && o.weight_decay == 2e-5));

    assert_eq!(
        report.checkpoints,
        vec![tmp.path().join("gcn-2.pth"), tmp.path().join("gcn-4.pth")]
    );
    assert_eq!(report.final_checkpoint, tmp.path().join("gcn-final.pth"));
    assert_eq!(
        *model.saved.borrow(),
        vec![
            tmp.path().join("gcn-2.pth"),
            tmp.path().join("gcn-4.pth"),
            tmp.path().join("gcn-final.pth"),
        ]
    );

    assert_eq!(report.epochs.len(), 5);
    assert_eq!(report.epochs[0].epoch, 1);
    assert_eq!(report.epochs[0].steps, 3);
    assert_abs_diff_eq!(report.epochs[2].learning_rate, 2e-5, epsilon = 1e-10);
    // 标签和分别为0、4、8，均值为4
    assert_abs_diff_eq!(report.epochs[4].mean_loss, 4.0);
    // 不打乱时按顺序取样
    assert_eq!(&model.seen_labels[..3], &[0, 1, 2]);
    assert_eq!(model.seen_labels.len(), 15);
}

#[test]
fn test_seeded_shuffle_visits_every_sample() {
    let tmp = tempfile::tempdir().unwrap();
    let config = TrainerConfig {
        epochs: 2,
        shuffle: true,
        seed: Some(3),
        ..config(tmp.path())
    };
    let source = InMemorySource { len: 6, fail_at: None };

    let mut first = RecordingModel::default();
    Trainer::new(config.clone()).unwrap().fit(&mut first, &source).unwrap();
    let mut second = RecordingModel::default();
    Trainer::new(config).unwrap().fit(&mut second, &source).unwrap();

    assert_eq!(first.seen_labels, second.seen_labels);
    for epoch in first.seen_labels.chunks(6) {
        let mut visited = epoch.to_vec();
        visited.sort_unstable();
        assert_eq!(visited, vec![0, 1, 2, 3, 4, 5]);
    }
}

#[test]
fn test_retrieval_error_aborts_training() {
    let tmp = tempfile::tempdir().unwrap();
    let trainer = Trainer::new(config(tmp.path())).unwrap();
    let mut model = RecordingModel::default();
    let source = InMemorySource { len: 4, fail_at: Some(2) };

    let result = trainer.fit(&mut model, &source);
    assert_err!(result, TrainError::Data(DataError::FileNotFound(_)));
    assert_eq!(model.seen_labels, vec![0, 1]);
    assert!(model.saved.borrow().is_empty());
}

#[test]
fn test_invalid_configs() {
    let tmp = tempfile::tempdir().unwrap();
    let base = config(tmp.path());

    let zero_epochs = TrainerConfig { epochs: 0, ..base.clone() };
    assert_err!(Trainer::new(zero_epochs), TrainError::Config(_));

    let bad_lr = TrainerConfig { learning_rate: 0., ..base.clone() };
    assert_err!(Trainer::new(bad_lr), TrainError::Config(_));

    let bad_factor = TrainerConfig { lr_decay_factor: -1., ..base.clone() };
    assert_err!(Trainer::new(bad_factor), TrainError::Config(_));

    let no_placeholder = TrainerConfig {
        checkpoint_template: "gcn.pth".to_string(),
        ..base.clone()
    };
    assert_err!(Trainer::new(no_placeholder), TrainError::Config(_));

    let trainer = Trainer::new(base).unwrap();
    let empty = InMemorySource { len: 0, fail_at: None };
    assert_err!(
        trainer.fit(&mut RecordingModel::default(), &empty),
        TrainError::Config(_)
    );
}
