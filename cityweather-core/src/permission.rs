use std::fmt::Debug;

pub const PERMANENTLY_DENIED_MESSAGE: &str =
    "Location permission permanently denied. Open app settings.";

pub const RATIONALE_MESSAGE: &str =
    "Your location is only used to find the nearest city for the weather report.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationPermission {
    Fine,
    Coarse,
}

pub trait PermissionChecker: Send + Sync + Debug {
    fn is_granted(&self, permission: LocationPermission) -> bool;
}

/// Either precise or approximate location is enough.
pub fn location_granted(checker: &dyn PermissionChecker) -> bool {
    checker.is_granted(LocationPermission::Fine) || checker.is_granted(LocationPermission::Coarse)
}

/// What the presentation layer should do next in the "locate me" flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStep {
    /// Permission held: resolve the city.
    Resolve,
    /// Ask the platform for permission.
    Request,
    /// Explain why the permission is needed, then ask again.
    ShowRationale,
    /// Permission will not be asked again; send the user to settings.
    OpenSettings,
}

pub fn start_locate(checker: &dyn PermissionChecker) -> LocateStep {
    if location_granted(checker) {
        LocateStep::Resolve
    } else {
        LocateStep::Request
    }
}

/// Step after the platform permission dialog returned.
pub fn after_request(granted: bool, should_show_rationale: bool) -> LocateStep {
    match (granted, should_show_rationale) {
        (true, _) => LocateStep::Resolve,
        (false, true) => LocateStep::ShowRationale,
        (false, false) => LocateStep::OpenSettings,
    }
}

/// Fixed answers, for hosts that decide permission up front.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticPermissions {
    pub fine: bool,
    pub coarse: bool,
}

impl StaticPermissions {
    pub fn granted() -> Self {
        Self {
            fine: true,
            coarse: true,
        }
    }

    pub fn denied() -> Self {
        Self::default()
    }
}

impl PermissionChecker for StaticPermissions {
    fn is_granted(&self, permission: LocationPermission) -> bool {
        match permission {
            LocationPermission::Fine => self.fine,
            LocationPermission::Coarse => self.coarse,
        }
    }
}
