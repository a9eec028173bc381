use super::Tensor;
use std::ops::{Index, IndexMut};

// 以定长数组索引单个元素，如`tensor[[n, c, y, x]]`
macro_rules! impl_fixed_index {
    ($($n:literal),*) => {
        $(
            impl Index<[usize; $n]> for Tensor {
                type Output = f32;

                fn index(&self, index: [usize; $n]) -> &Self::Output {
                    assert!(self.dimension() == $n, "索引维度与张量维度不一致");
                    &self.data[&index[..]]
                }
            }

            impl IndexMut<[usize; $n]> for Tensor {
                fn index_mut(&mut self, index: [usize; $n]) -> &mut Self::Output {
                    assert!(self.dimension() == $n, "索引维度与张量维度不一致");
                    &mut self.data[&index[..]]
                }
            }
        )*
    };
}

impl_fixed_index!(1, 2, 3, 4);
