use std::collections::HashSet;

use ndarray::{Array2, Array3};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::assert_err;
use crate::data::augment::scaled_len;
use crate::data::{AugmentConfig, Augmentor, DataError, Transform};
use crate::tensor::Tensor;

fn ramp_image(h: usize, w: usize) -> Tensor {
    Tensor::from_array(Array3::from_shape_fn((h, w, 3), |(y, x, c)| {
        (y * w + x) as f32 + c as f32 * 0.5
    }))
}

fn stripe_label(h: usize, w: usize) -> Array2<u8> {
    Array2::from_shape_fn((h, w), |(y, x)| ((y / 2 + x / 3) % 4) as u8)
}

#[test]
fn test_default_config_emits_five_rotations() {
    let config = AugmentConfig::default();
    assert_eq!(
        config.plan(),
        vec![
            Transform::Rotation(-16.),
            Transform::Rotation(-8.),
            Transform::Rotation(0.),
            Transform::Rotation(8.),
            Transform::Rotation(16.),
        ]
    );
    assert_eq!(config.variant_count(), 5);
}

#[test]
fn test_plan_order_and_unit_scale_dedupe() {
    let config = AugmentConfig::default()
        .identity(true)
        .scale(&[0.8, 1.0, 1.2])
        .rotation(&[8.]);
    assert_eq!(
        config.plan(),
        vec![
            Transform::Identity,
            Transform::Scale(0.8),
            Transform::Scale(1.2),
            Transform::Rotation(8.),
        ]
    );

    // 没有原图变体时，系数1.0保留
    let config = AugmentConfig::default().scale(&[0.8, 1.0]).no_rotation();
    assert_eq!(config.plan(), vec![Transform::Scale(0.8), Transform::Scale(1.0)]);
}

#[test]
fn test_validate_rejects_bad_configs() {
    let nothing = AugmentConfig::default().no_rotation();
    assert_err!(nothing.validate(8, 8), DataError::Config("未启用任何增强变体"));

    let negative = AugmentConfig::default().scale(&[-0.5]);
    assert_err!(negative.validate(8, 8), DataError::Config(_));

    // 0.1 * 8 = 0.8 -> 0
    let vanishing = AugmentConfig::default().scale(&[0.1]);
    assert_err!(vanishing.validate(8, 8), DataError::Config(_));
    assert!(vanishing.validate(10, 10).is_ok());

    // 放大后的尺寸溢出或过大
    let huge = AugmentConfig::default().scale(&[1e20]);
    assert_err!(huge.validate(8, 8), DataError::Config(_));
    assert_err!(Augmentor::new(huge, (8, 8)), DataError::Config(_));
    let too_large = AugmentConfig::default().scale(&[1.5, 100.]);
    assert_err!(too_large.validate(512, 1024), DataError::Config(_));
    assert!(AugmentConfig::default().scale(&[1.5, 1.75]).validate(512, 1024).is_ok());

    let empty = AugmentConfig::default().scale(&[]);
    assert_err!(empty.validate(8, 8), DataError::Config(_));

    let nan = AugmentConfig::default().rotation(&[f64::NAN]);
    assert_err!(nan.validate(8, 8), DataError::Config(_));

    assert_err!(
        Augmentor::new(AugmentConfig::default().no_rotation(), (4, 4)),
        DataError::Config(_)
    );
}

#[test]
fn test_scaled_len_truncates() {
    assert_eq!(scaled_len(0.8, 512), 409);
    assert_eq!(scaled_len(1.4, 512), 716);
    assert_eq!(scaled_len(1.6, 5), 8);
    assert_eq!(scaled_len(1.0, 7), 7);
}

#[test]
fn test_scale_variants_return_to_canonical_size() {
    let (h, w) = (512, 512);
    let augmentor = Augmentor::new(
        AugmentConfig::default().scale(&[0.8, 1.4]).no_rotation(),
        (h, w),
    )
    .unwrap();
    let image = ramp_image(h, w);
    let label = stripe_label(h, w);

    let variants = augmentor
        .augment(&image, &label, &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(variants.len(), 2);
    for variant in &variants {
        assert_eq!(variant.image.shape(), &[h, w, 3]);
        assert_eq!(variant.label.dim(), (h, w));
    }
}

#[test]
fn test_rotation_by_zero_is_exact() {
    let (h, w) = (9, 12);
    let augmentor = Augmentor::new(AugmentConfig::default().rotation(&[0.]), (h, w)).unwrap();
    let image = ramp_image(h, w);
    let label = stripe_label(h, w);

    let variants = augmentor
        .augment(&image, &label, &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(variants.len(), 1);
    assert_eq!(variants[0].transform, Transform::Rotation(0.));
    assert_eq!(variants[0].image, image);
    assert_eq!(variants[0].label, label);
}

#[test]
fn test_identity_variant_is_unchanged() {
    let augmentor = Augmentor::new(AugmentConfig::default().identity(true).no_rotation(), (4, 6))
        .unwrap();
    let image = ramp_image(4, 6);
    let label = stripe_label(4, 6);
    let variants = augmentor
        .augment(&image, &label, &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(variants.len(), 1);
    assert_eq!(variants[0].transform, Transform::Identity);
    assert_eq!(variants[0].image, image);
    assert_eq!(variants[0].label, label);
}

#[test]
fn test_downscale_pads_with_extra_row_on_top() {
    // 5 * 0.5 = 2.5 -> 2，缺3：上/左补2，下/右补1
    let augmentor = Augmentor::new(AugmentConfig::default().scale(&[0.5]).no_rotation(), (5, 5))
        .unwrap();
    let image = Tensor::full(1., &[5, 5, 3]);
    let label = Array2::from_elem((5, 5), 7u8);

    let variant = augmentor
        .apply(Transform::Scale(0.5), &image, &label, &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(variant.label.dim(), (5, 5));
    for y in 0..5 {
        for x in 0..5 {
            let inside = (2..4).contains(&y) && (2..4).contains(&x);
            assert_eq!(variant.label[[y, x]], if inside { 7 } else { 0 }, "({y}, {x})");
            let expected = if inside { 1. } else { 0. };
            assert_eq!(variant.image[[y, x, 0]], expected, "({y}, {x})");
        }
    }
}

#[test]
fn test_upscale_crop_stays_in_bounds() {
    let (h, w) = (10, 10);
    let augmentor = Augmentor::new(AugmentConfig::default().scale(&[1.6]).no_rotation(), (h, w))
        .unwrap();
    let image = ramp_image(h, w);
    let label = Array2::from_shape_fn((h, w), |(y, _)| y as u8);

    let mut first_rows = HashSet::new();
    for seed in 0..64 {
        let variant = augmentor
            .apply(Transform::Scale(1.6), &image, &label, &mut StdRng::seed_from_u64(seed))
            .unwrap();
        assert_eq!(variant.image.shape(), &[h, w, 3]);
        assert_eq!(variant.label.dim(), (h, w));
        // 放大到16行后按最近邻取行号，窗口上沿只能落在[0, 6]
        let top = (0..=6usize).find(|top| {
            (0..h).all(|r| usize::from(variant.label[[r, 0]]) == (top + r) * 10 / 16)
        });
        assert!(top.is_some(), "seed {seed}: {:?}", variant.label.column(0));
        first_rows.insert(variant.label[[0, 0]]);
    }
    // 裁剪位置确实是随机的
    assert!(first_rows.len() > 1);
}

#[test]
fn test_rotated_labels_stay_in_source_set() {
    let (h, w) = (16, 16);
    let augmentor = Augmentor::new(AugmentConfig::default(), (h, w)).unwrap();
    let image = ramp_image(h, w);
    let label = Array2::from_shape_fn((h, w), |(y, x)| [3u8, 7, 11][(y + x) % 3]);

    let variants = augmentor
        .augment(&image, &label, &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(variants.len(), 5);
    for variant in &variants {
        assert_eq!(variant.image.shape(), &[h, w, 3]);
        // 0是越界填充值
        assert!(variant.label.iter().all(|v| [0u8, 3, 7, 11].contains(v)));
    }
}

#[test]
fn test_augment_rejects_wrong_sizes() {
    let augmentor = Augmentor::new(AugmentConfig::default(), (4, 4)).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    let image = ramp_image(5, 4);
    let label = stripe_label(5, 4);
    assert_err!(
        augmentor.augment(&image, &label, &mut rng),
        DataError::ShapeMismatch { .. }
    );

    let image = ramp_image(4, 4);
    let label = stripe_label(4, 3);
    assert_err!(
        augmentor.augment(&image, &label, &mut rng),
        DataError::ShapeMismatch { .. }
    );
}
