//! # Petri 网输入模型（Place/Transition Net）
//!
//! 网由关联矩阵 `C ∈ ℤ^{|P|×|T|}` 与初始标识 `M0 ∈ ℕ^{|P|}` 给出。
//! `C[p, t] < 0` 表示迁移 `t` 从库所 `p` 取走 `-C[p, t]` 个 token，
//! `C[p, t] > 0` 表示放入 `C[p, t]` 个 token。对任意标识 `M`：
//!
//! * 迁移 `t` **可激发** 当且仅当 `∀p: C[p, t] < 0 ⇒ M[p] ≥ -C[p, t]`；
//! * 迁移 **发射** 后标识为 `M' = M + C[:, t]`。
//!
//! 不设容量上界，网不要求是 1-safe。
//!
//! ## 示例
//!
//! ```rust
//! use pn_unfold::net::*;
//!
//! let net = Net::new(vec![vec![-1, 1], vec![1, -1]], vec![1, 0]).unwrap();
//! let t1 = TransitionId::new(0);
//!
//! let marking = net.initial_marking();
//! assert_eq!(net.enabled_transitions(marking), vec![t1]);
//! let next = fire(marking, net.template(t1));
//! assert_eq!(next.tokens(PlaceId::new(0)), 0);
//! assert_eq!(next.tokens(PlaceId::new(1)), 1);
//! ```

pub mod core;
pub mod ids;
pub mod incidence;
pub mod index_vec;
pub mod io;
pub mod structure;

pub use self::core::{MalformedNetError, Net, fire, is_enabled};
pub use ids::{ConditionId, EventId, PlaceId, TransitionId};
pub use incidence::Incidence;
pub use index_vec::{Idx, IndexVec};
pub use structure::{Delta, Marking, Template, Weight};
