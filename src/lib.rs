//! Petri 网展开工具.
//!
//! 输入为关联矩阵（行 = 库所, 列 = 迁移）和初始标识, 输出为展开后的扩展矩阵,
//! 其中回到已访问标识的发射被截断, 并以副本库所/迁移 `p(k)`/`t(k)` 表示.
#![warn(non_snake_case)]

pub mod config;
pub mod net;
pub mod options;
pub mod report;
pub mod unfold;

pub use config::UnfoldConfig;
pub use net::{MalformedNetError, Net};
pub use unfold::{UnfoldError, Unfolder, Unfolding, unfold_matrix};
