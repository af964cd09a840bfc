//! App - アプリケーション層
//!
//! ports と impls を組み合わせて、ストアの登録と依存関係の固定を行う。
//!
//! # 主要コンポーネント
//! - **StorageBuilder**: モジュールの組み込みと fail-fast なワイヤリング
//! - **InMemStoresModule**: インメモリのストアを主キー・代替キーに登録
//! - **StoreRegistry**: キー → ストアの登録表
//! - **RequirementsRefresh**: パッケージングツールの依存関係を固定

pub mod builder;
pub mod module;
pub mod registry;
pub mod requirements;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, Storage, StorageBuilder};
pub use self::module::{InMemStoresModule, InMemStoresModuleBuilder, StoresModule};
pub use self::registry::{BoundStore, Registration, RegistryError, StoreRegistry};
pub use self::requirements::{
    RefreshError, RefreshReport, RefreshSettings, RequirementsRefresh,
};
