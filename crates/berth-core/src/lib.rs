//! berth-core
//!
//! Storage wiring for a cluster scheduler, plus the requirements refresh tool.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（JobKey, ScheduledTask, ScheduleStatus, TaskQuery, errors）
//! - **ports**: 抽象化レイヤー（CronJobStore, TaskStore, KeyFactory, Clock, CommandRunner など）
//! - **impls**: 実装（MemJobStore, MemTaskStore, key factories, SystemCommandRunner）
//! - **app**: 登録表・ストアモジュール・StorageBuilder・RequirementsRefresh
//! - **config**: TOML 設定（`${VAR}` 展開つき）

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
