/*
 * Responsibility
 * - middleware の公開インターフェース
 * - http: transport 共通 layer
 * - auth: 認証コンテキストの付与
 * - params: resolver stage (organization / group / organization member)
 */
pub mod auth;
pub mod http;
pub mod params;
