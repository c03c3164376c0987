//! # 外部 API クライアント
//!
//! 上流 Platform API との通信を担当する。

pub mod platform_api;

pub use platform_api::{
    API_KEY_HEADER,
    PlatformApiClient,
    PlatformApiClientImpl,
    PlatformApiError,
    PlatformAuthClient,
    PlatformCatalogClient,
    PlatformHealthClient,
    PlatformUserClient,
    UpstreamResponse,
};
