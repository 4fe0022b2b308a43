//! Walk-forward backtesting and selection of the dynamic super model.

pub mod backtest;
pub mod tuner;

pub use backtest::{backtest, BacktestResult, MethodCounts};
pub use tuner::{is_better, select_best, tune, DynamicSuperModel, FusionEngine, ModelSummary};
