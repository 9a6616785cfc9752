//! repoup-core
//!
//! Core building blocks for upgrading an OSx plugin repo proxy.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（version, action, permission, network, ens, ids, errors, events）
//! - **ports**: 抽象化レイヤー（ChainClient, DeploymentRegistry, SignerStrategy, ProposalSink）
//! - **app**: アプリケーションロジック（UpgradeDecisionProcedure, UpgradeRunner, publish）
//! - **impls**: 実装（InMemoryChain, StaticDeploymentRegistry, JsonFileProposalSink など）
//! - **config**: TOML 設定

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
