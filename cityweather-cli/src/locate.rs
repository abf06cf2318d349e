//! The "weather where I am" flow: permission prompt, city resolution, fetch.

use std::sync::Arc;

use anyhow::Context;
use cityweather_core::{
    Config, Coordinates, LocationConsent, LocationResolver,
    location::{FixedLocation, IpLocationProvider, LocationProvider, NominatimGeocoder},
    permission::{
        LocateStep, LocationPermission, PERMANENTLY_DENIED_MESSAGE, PermissionChecker,
        RATIONALE_MESSAGE, after_request, start_locate,
    },
};
use inquire::Confirm;
use tokio_util::sync::CancellationToken;

use crate::{cli, render};

/// Location permission as recorded in the config file.
#[derive(Debug, Clone, Copy)]
struct ConsentPermissions(Option<LocationConsent>);

impl PermissionChecker for ConsentPermissions {
    fn is_granted(&self, _permission: LocationPermission) -> bool {
        self.0 == Some(LocationConsent::Granted)
    }
}

pub async fn run(config: &mut Config, at: Option<(f64, f64)>) -> anyhow::Result<()> {
    if !ensure_permission(config)? {
        return Ok(());
    }

    let provider: Arc<dyn LocationProvider> = match at {
        Some((latitude, longitude)) => {
            let at = Coordinates {
                latitude,
                longitude,
            };
            Arc::new(FixedLocation(at))
        }
        None => Arc::new(IpLocationProvider::default()),
    };
    let resolver = LocationResolver::new(
        Arc::new(ConsentPermissions(config.location_consent())),
        provider,
        Arc::new(NominatimGeocoder::default()),
    );
    let vm = cli::view_model(config);

    eprintln!("Locating...");
    let cancel = CancellationToken::new();
    let task = tokio::select! {
        task = vm.locate_and_fetch(&resolver, &cancel) => task,
        () = cli::interrupted() => {
            cancel.cancel();
            render::cancelled();
            return Ok(());
        }
    };

    match task {
        Some(task) => cli::drive(&vm, task, cli::interrupted()).await,
        None => {
            let mut events = vm.events().subscribe().await;
            for event in events.drain() {
                render::event(&event);
            }
            Ok(())
        }
    }
}

/// Walk the permission flow; `true` once location may be used.
fn ensure_permission(config: &mut Config) -> anyhow::Result<bool> {
    let mut step = start_locate(&ConsentPermissions(config.location_consent()));

    loop {
        match step {
            LocateStep::Resolve => return Ok(true),
            LocateStep::Request => {
                let previous = config.location_consent();
                let granted = previous != Some(LocationConsent::Never)
                    && ask("Allow cityweather to use your location?")?;

                let (consent, next) = next_step(granted, previous);
                config.set_location_consent(Some(consent));
                config.save()?;
                step = next;
            }
            LocateStep::ShowRationale => {
                println!("{RATIONALE_MESSAGE}");
                if !ask("Ask again?")? {
                    return Ok(false);
                }
                step = LocateStep::Request;
            }
            LocateStep::OpenSettings => {
                eprintln!("! {PERMANENTLY_DENIED_MESSAGE}");
                eprintln!(
                    "  Run `cityweather configure --reset-location` or edit {}",
                    Config::config_file_path()?.display()
                );
                return Ok(false);
            }
        }
    }
}

/// Consent to record after the prompt, and where the flow goes from there.
/// The first refusal still allows the rationale; a second one is final.
fn next_step(granted: bool, previous: Option<LocationConsent>) -> (LocationConsent, LocateStep) {
    let consent = match (granted, previous) {
        (true, _) => LocationConsent::Granted,
        (false, None) => LocationConsent::Denied,
        (false, Some(_)) => LocationConsent::Never,
    };
    let step = after_request(granted, consent == LocationConsent::Denied);
    (consent, step)
}

fn ask(question: &str) -> anyhow::Result<bool> {
    Confirm::new(question)
        .with_default(false)
        .prompt()
        .context("Failed to read answer")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_granted_consent_counts() {
        let granted = ConsentPermissions(Some(LocationConsent::Granted));
        let denied = ConsentPermissions(Some(LocationConsent::Denied));
        let unset = ConsentPermissions(None);

        assert!(granted.is_granted(LocationPermission::Fine));
        assert!(!denied.is_granted(LocationPermission::Coarse));
        assert!(!unset.is_granted(LocationPermission::Fine));
    }

    #[test]
    fn stored_consent_skips_the_prompt() {
        let step = start_locate(&ConsentPermissions(Some(LocationConsent::Granted)));
        assert_eq!(step, LocateStep::Resolve);
    }

    #[test]
    fn first_refusal_leads_to_rationale() {
        let (consent, step) = next_step(false, None);
        assert_eq!(consent, LocationConsent::Denied);
        assert_eq!(step, LocateStep::ShowRationale);
    }

    #[test]
    fn second_refusal_is_final() {
        let (consent, step) = next_step(false, Some(LocationConsent::Denied));
        assert_eq!(consent, LocationConsent::Never);
        assert_eq!(step, LocateStep::OpenSettings);

        let (consent, step) = next_step(false, Some(LocationConsent::Never));
        assert_eq!(consent, LocationConsent::Never);
        assert_eq!(step, LocateStep::OpenSettings);
    }

    #[test]
    fn granting_resolves_at_any_point() {
        for previous in [None, Some(LocationConsent::Denied)] {
            let (consent, step) = next_step(true, previous);
            assert_eq!(consent, LocationConsent::Granted);
            assert_eq!(step, LocateStep::Resolve);
        }
    }

    #[test]
    fn recorded_refusal_drives_the_next_check() {
        let (consent, _) = next_step(false, None);
        let step = start_locate(&ConsentPermissions(Some(consent)));
        assert_eq!(step, LocateStep::Request);

        let (consent, _) = next_step(true, Some(consent));
        let step = start_locate(&ConsentPermissions(Some(consent)));
        assert_eq!(step, LocateStep::Resolve);
    }
}
