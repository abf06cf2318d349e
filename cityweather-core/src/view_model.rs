//! Owner of the UI state and driver of the fetch state machine.
//!
//! State lives in a `watch` cell that only this module writes. Each call to
//! [`WeatherViewModel::get_forecast`] supersedes the previous one: the older
//! task is aborted, and a generation counter keeps any write that races the
//! abort from reaching the state or the event queue. Dropping the last
//! handle aborts the fetch still in flight.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use parking_lot::Mutex;
use tokio::{
    sync::watch,
    task::{AbortHandle, JoinHandle},
};
use tokio_util::sync::CancellationToken;

use crate::{
    events::{EventSender, EventStream, UiEvent, event_channel},
    location::LocationResolver,
    repository::WeatherRepository,
    state::{Failure, FetchPhase, Forecast, WeatherUiState},
};

pub const LOCATION_UNRESOLVED_MESSAGE: &str = "Couldn't resolve city from location";

#[derive(Debug, Clone)]
pub struct WeatherViewModel {
    inner: Arc<Inner>,
    _owner: Arc<AbortOnDrop>,
}

/// Held by view-model handles only, never by spawned tasks.
#[derive(Debug)]
struct AbortOnDrop(Arc<Inner>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if let Some(task) = self.0.in_flight.lock().take() {
            tracing::debug!("view-model dropped, aborting in-flight fetch");
            task.abort();
        }
    }
}

#[derive(Debug)]
struct Inner {
    repo: WeatherRepository,
    api_key: String,
    state: watch::Sender<WeatherUiState>,
    events: EventSender,
    event_stream: EventStream,
    generation: AtomicU64,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl WeatherViewModel {
    /// A blank `api_key` is accepted; fetches then fail with
    /// [`Failure::MissingApiKey`].
    pub fn new(repo: WeatherRepository, api_key: impl Into<String>) -> Self {
        let (state, _) = watch::channel(WeatherUiState::default());
        let (events, event_stream) = event_channel();

        let inner = Arc::new(Inner {
            repo,
            api_key: api_key.into(),
            state,
            events,
            event_stream,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        });

        Self {
            _owner: Arc::new(AbortOnDrop(Arc::clone(&inner))),
            inner,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> WeatherUiState {
        self.inner.state.borrow().clone()
    }

    /// Read-only stream of snapshots.
    pub fn watch_state(&self) -> watch::Receiver<WeatherUiState> {
        self.inner.state.subscribe()
    }

    pub fn events(&self) -> &EventStream {
        &self.inner.event_stream
    }

    pub fn update_city_name(&self, name: &str) {
        self.inner.state.send_modify(|s| {
            s.city_name = name.to_string();
            if matches!(s.phase, FetchPhase::Failed(_)) {
                s.phase = FetchPhase::Idle;
            }
        });
    }

    /// Start a fetch for the current city name, replacing any fetch still in
    /// flight. Must be called from within a tokio runtime.
    pub fn get_forecast(&self) -> JoinHandle<()> {
        let mut in_flight = self.inner.in_flight.lock();

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = in_flight.take() {
            tracing::debug!("superseding in-flight fetch");
            previous.abort();
        }

        let city = self.inner.state.borrow().city_name.trim().to_string();

        if city.is_empty() {
            let failed = FetchPhase::Failed(Failure::EmptyCity);
            self.inner.apply(generation, |s| s.phase = failed);

            let events = self.inner.events.clone();
            let notice = UiEvent::ShowSnackbar(Failure::EmptyCity.notice());
            return tokio::spawn(async move { events.send(notice).await });
        }

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move { inner.fetch(generation, city).await });
        *in_flight = Some(handle.abort_handle());
        handle
    }

    /// Abort whatever fetch is in flight. A `Loading` phase falls back to
    /// `Idle`.
    pub fn cancel(&self) {
        let mut in_flight = self.inner.in_flight.lock();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = in_flight.take() {
            previous.abort();
        }
        self.inner.apply(generation, |s| {
            if s.is_loading() {
                s.phase = FetchPhase::Idle;
            }
        });
    }

    /// Resolve the device's city and fetch its weather.
    ///
    /// Returns the fetch task, or `None` if no city could be resolved (a
    /// notification is emitted in that case).
    pub async fn locate_and_fetch(
        &self,
        resolver: &LocationResolver,
        cancel: &CancellationToken,
    ) -> Option<JoinHandle<()>> {
        match resolver.city_from_location(cancel).await {
            Some(city) if !city.trim().is_empty() => {
                tracing::info!(%city, "resolved city from location");
                self.update_city_name(&city);
                Some(self.get_forecast())
            }
            _ => {
                let notice = UiEvent::ShowSnackbar(LOCATION_UNRESOLVED_MESSAGE.to_string());
                self.inner.events.send(notice).await;
                None
            }
        }
    }
}

impl Inner {
    async fn fetch(&self, generation: u64, city: String) {
        if !self.apply(generation, |s| s.phase = FetchPhase::Loading) {
            return;
        }

        if self.api_key.trim().is_empty() {
            self.fail(generation, Failure::MissingApiKey).await;
            return;
        }

        match self.repo.fetch_current_weather(&city, &self.api_key).await {
            Ok(current) => {
                let forecast = Forecast::from_current(&city, &current);
                tracing::info!(city = %forecast.city, temp = %forecast.temp, "weather updated");
                self.apply(generation, |s| s.phase = FetchPhase::Success(forecast));
            }
            Err(err) => self.fail(generation, Failure::from_api_error(&err)).await,
        }
    }

    /// The queue slot is reserved before the phase changes: an abort while
    /// the queue is full leaves the phase untouched, so `Failed` is never
    /// shown without its notice.
    async fn fail(&self, generation: u64, failure: Failure) {
        let notice = UiEvent::ShowSnackbar(failure.notice());
        let permit = self.events.reserve().await;

        let applied = self.apply(generation, |s| s.phase = FetchPhase::Failed(failure));
        if let (true, Some(permit)) = (applied, permit) {
            permit.send(notice);
        }
    }

    /// Apply `update` only if `generation` is still the latest fetch.
    fn apply(&self, generation: u64, update: impl FnOnce(&mut WeatherUiState)) -> bool {
        self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            update(s);
            true
        })
    }
}
