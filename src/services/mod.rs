/*
 * Responsibility
 * - handler から呼ばれる domain 側の処理
 * - authz: 認可 gate (外部 policy engine への入口)
 * - group_mutation: group 更新の transaction 調停
 */
pub mod authz;
pub mod group_mutation;
