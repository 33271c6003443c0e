/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が上流 gateway の header を検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - 認証そのものは上流の責務。ここは「型（契約）」として固定化する
 * - 認可判断は services::authz の Authorizer に subject として渡す
 */

use uuid::Uuid;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `user_id` は内部ユーザーID
/// - `roles` は policy engine に渡す role 文字列 (解釈は Authorizer 側)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

impl AuthCtx {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            roles: Vec::new(),
        }
    }
}
