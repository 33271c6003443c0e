/*
 * Responsibility
 * - path parameter を domain object に解決する resolver stage 群
 * - 実行順は routes 側の route_layer の積み方で決まる (後に積んだものが先に走る)
 *   - group → organization
 *   - organization → organization member
 */
pub mod group;
pub mod member;
pub mod organization;
pub mod route_params;

pub use group::extract_group_param;
pub use member::extract_organization_member_param;
pub use organization::extract_organization_param;
