use ndarray::{Array, ArrayD, IxDyn};

use crate::errors::TensorError;

mod index;
mod property;
mod shape;

#[cfg(test)]
mod tests;

/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 本库中张量主要承载浮点图像批次`[N, C, H, W]`、单张图像`[H, W, C]`以及类别权重`[num_classes]`；
/// 标签图由于是整数类别，直接使用`ndarray`的整数数组，不经过`Tensor`。
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Array<f32, IxDyn>,
}

impl Tensor {
    /// 创建一个张量，若为标量，`shape`可以是[]、[1]、[1,1]、[1,1,1]...
    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]；
    /// 注：`data`的长度必须和`shape`中所有元素的乘积相等，否则panic。
    pub fn new(data: &[f32], shape: &[usize]) -> Tensor {
        let expected = shape.iter().product::<usize>();
        assert!(
            data.len() == expected,
            "{}",
            TensorError::DataLenMismatch {
                data_len: data.len(),
                shape: shape.to_vec(),
                expected,
            }
        );
        let data = Array::from_shape_vec(IxDyn(shape), data.to_vec()).unwrap();
        Tensor { data }
    }

    /// 创建一个元素全为0的张量
    pub fn zeros(shape: &[usize]) -> Tensor {
        Tensor {
            data: Array::zeros(IxDyn(shape)),
        }
    }

    /// 创建一个元素全为`value`的张量
    pub fn full(value: f32, shape: &[usize]) -> Tensor {
        Tensor {
            data: Array::from_elem(IxDyn(shape), value),
        }
    }

    /// 直接由`ndarray`数组构建（任意维度）
    pub fn from_array<D: ndarray::Dimension>(array: Array<f32, D>) -> Tensor {
        Tensor {
            data: array.into_dyn(),
        }
    }

    /// 交出内部的`ndarray`数组
    pub fn into_array(self) -> ArrayD<f32> {
        self.data
    }
}
