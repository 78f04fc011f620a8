/// Модуль предобработки данных

pub mod cleaning;
pub mod encoding;
pub mod normalization;
pub mod split;

pub use cleaning::drop_missing;
pub use encoding::{CategoryEntry, OneHotEncoder};
pub use normalization::{
    compute_stats, compute_stats_for, denormalize, normalize, FeatureStats, NormalizationStats,
};
pub use split::{separate_label, train_test_split, train_test_split_with_rng};
