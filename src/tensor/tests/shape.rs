use crate::assert_panic;
use crate::errors::TensorError;
use crate::tensor::Tensor;

//↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓stack↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓
#[test]
fn test_stack() {
    // 1.空张量的堆叠
    assert_panic!(Tensor::stack(&[]), TensorError::EmptyList);

    // 2.图像张量的堆叠：[C, H, W] -> [N, C, H, W]
    let t1 = Tensor::new(&[1., 2., 3., 4.], &[1, 2, 2]);
    let t2 = Tensor::new(&[5., 6., 7., 8.], &[1, 2, 2]);
    let stacked = Tensor::stack(&[&t1, &t2]);
    assert_eq!(stacked.shape(), &[2, 1, 2, 2]);
    assert_eq!(stacked[[0, 0, 1, 1]], 4.);
    assert_eq!(stacked[[1, 0, 0, 0]], 5.);

    // 3.形状不一致则报错
    let t3 = Tensor::new(&[1., 2.], &[1, 1, 2]);
    assert_panic!(Tensor::stack(&[&t1, &t3]), TensorError::InconsitentShape);
}
//↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑stack↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑

#[test]
fn test_permute_hwc_to_chw() {
    // [H=1, W=2, C=3]
    let hwc = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[1, 2, 3]);
    let chw = hwc.permute(&[2, 0, 1]);
    assert_eq!(chw.shape(), &[3, 1, 2]);
    assert_eq!(chw.to_vec(), vec![1., 4., 2., 5., 3., 6.]);
}

#[test]
fn test_permute_invalid_axes() {
    let tensor = Tensor::new(&[1., 2., 3., 4.], &[2, 2]);
    assert_panic!(tensor.permute(&[0]), TensorError::PermuteNeedAtLeast2Dims);
    assert_panic!(
        tensor.permute(&[0, 0]),
        TensorError::PermuteNeedUniqueAndInRange
    );
    assert_panic!(
        tensor.permute(&[0, 2]),
        TensorError::PermuteNeedUniqueAndInRange
    );
}
