use canteen_service::{STAFF_ONLY, STUDENT_ONLY};
use common_auth::{ensure_role, Role};

#[test]
fn student_allowed_on_order_placement() {
    ensure_role(Role::Student, STUDENT_ONLY).expect("student should place orders");
}

#[test]
fn staff_allowed_on_order_management() {
    ensure_role(Role::Staff, STAFF_ONLY).expect("staff should manage orders");
}

#[test]
fn student_rejected_on_staff_routes() {
    assert!(ensure_role(Role::Student, STAFF_ONLY).is_err());
}

#[test]
fn staff_rejected_on_student_routes() {
    assert!(ensure_role(Role::Staff, STUDENT_ONLY).is_err());
}
