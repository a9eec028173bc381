use crate::assert_panic;
use crate::tensor::Tensor;

#[test]
fn test_index_read_write() {
    let mut tensor = Tensor::zeros(&[2, 3]);
    tensor[[1, 2]] = 7.;
    assert_eq!(tensor[[1, 2]], 7.);
    assert_eq!(tensor.to_vec(), vec![0., 0., 0., 0., 0., 7.]);

    let mut tensor = Tensor::zeros(&[1, 2, 2, 3]);
    tensor[[0, 1, 0, 2]] = -1.;
    assert_eq!(tensor[[0, 1, 0, 2]], -1.);
}

#[test]
fn test_index_with_wrong_rank() {
    let tensor = Tensor::zeros(&[2, 3]);
    assert_panic!(tensor[[0, 0, 0]], "索引维度与张量维度不一致");
}
