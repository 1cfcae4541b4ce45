//! Pure filters backing the booking wizard's catalog queries: which
//! branches, services and staff members a customer may pick from.

use crate::models::{Branch, Service, Staff};

/// Branches offered to customers: online and visible only.
pub fn visible_branches(branches: &[Branch]) -> Vec<Branch> {
    branches
        .iter()
        .filter(|branch| branch.online && branch.visible)
        .cloned()
        .collect()
}

/// Services offered at a branch.
///
/// A service qualifies when it is available and visible, lists the branch,
/// and has at least one assigned staff member who both works at the branch
/// and provides the service. The last rule matters: a service whose
/// assigned staff all work elsewhere would give the customer an empty staff
/// step later in the wizard.
pub fn services_for_branch(services: &[Service], staff: &[Staff], branch_id: &str) -> Vec<Service> {
    services
        .iter()
        .filter(|service| {
            if !service.available || !service.visible {
                return false;
            }
            if !service.branches.iter().any(|b| b == branch_id) {
                return false;
            }
            if service.staff_ids.is_empty() {
                return false;
            }
            service.staff_ids.iter().any(|staff_id| {
                staff.iter().any(|member| {
                    member.id == *staff_id
                        && member.branches.iter().any(|b| b == branch_id)
                        && member.services.iter().any(|s| s == &service.id)
                })
            })
        })
        .cloned()
        .collect()
}

/// Staff members who provide a service, optionally restricted to one branch.
pub fn staff_for_service(staff: &[Staff], service_id: &str, branch_id: Option<&str>) -> Vec<Staff> {
    staff
        .iter()
        .filter(|member| member.services.iter().any(|s| s == service_id))
        .filter(|member| {
            branch_id.map_or(true, |branch| member.branches.iter().any(|b| b == branch))
        })
        .cloned()
        .collect()
}
