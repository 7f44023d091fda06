//! # 展开（unfolding）
//!
//! 从初始标识出发做深度优先探索，把原网中的环"展开"为新的库所/迁移实例，
//! 得到一个（基本）无环的扩展关联矩阵。
//!
//! * 发射到活动路径上没有出现过的标识：新节点，继续递归；
//! * 发射回到活动路径上的祖先标识：截断，生成一个副本迁移 `t(k)`，
//!   它按模板从相同的库所取 token，并向每个增加了 token 的库所的副本 `p(k)` 输出；
//! * 副本编号按原始名称各自从 1 递增，整个运行内唯一。
//!
//! ## 示例
//!
//! ```rust
//! use pn_unfold::config::UnfoldConfig;
//! use pn_unfold::net::Net;
//! use pn_unfold::unfold::Unfolder;
//!
//! let net = Net::new(vec![vec![-1, 1], vec![1, -1]], vec![1, 0]).unwrap();
//! let unfolding = Unfolder::new(&net, UnfoldConfig::default()).run().unwrap();
//!
//! assert_eq!(unfolding.places.as_slice(), &["p1", "p2", "p1(1)"]);
//! assert_eq!(unfolding.transitions.as_slice(), &["t1", "t2", "t2(1)"]);
//! assert_eq!(unfolding.marking.as_slice(), &[1, 0, 0]);
//! ```

pub mod builder;
pub mod engine;
pub mod graph;
pub mod registry;
pub mod result;

pub use builder::{ConditionOrigin, EventOrigin, Extension, Origin, SeedPolicy};
pub use engine::{Step, UnboundedExplorationError, UnfoldError, UnfoldStats, Unfolder};
pub use graph::{ExplorationEdge, ExplorationGraph};
pub use registry::DuplicateRegistry;
pub use result::Unfolding;

use crate::config::UnfoldConfig;
use crate::net::Net;
use crate::net::structure::Delta;

/// Validates `matrix`/`initial_marking` and unfolds the resulting net.
pub fn unfold_matrix(
    matrix: Vec<Vec<Delta>>,
    initial_marking: Vec<i64>,
    config: UnfoldConfig,
) -> Result<Unfolding, UnfoldError> {
    let net = Net::new(matrix, initial_marking)?;
    Unfolder::new(&net, config).run()
}
