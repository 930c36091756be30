/*!
Probe simulée pour tester les sweeps sans lancer `ping`

Les IPs déclarées joignables répondent "up", les autres "down". Enregistre
les appels et le pic de checks simultanés pour vérifier le limiteur.
*/

use async_trait::async_trait;
use printwatch_core::probe::{Probe, DEADLINE_GRACE};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct StubState {
    reachable: Mutex<HashSet<String>>,
    hanging: Mutex<HashSet<String>>,
    delay: Mutex<Duration>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Probe qui simule un parc d'imprimantes
#[derive(Clone, Default)]
pub struct StubProbe {
    state: Arc<StubState>,
}

impl StubProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// IPs qui répondent au ping
    pub fn with_reachable<I, S>(self, ips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.reachable.lock().unwrap().extend(ips.into_iter().map(Into::into));
        self
    }

    /// IPs dont le ping ne revient qu'au deadline (tué puis compté "down")
    pub fn with_hanging<I, S>(self, ips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.hanging.lock().unwrap().extend(ips.into_iter().map(Into::into));
        self
    }

    /// Latence simulée de chaque check
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.state.delay.lock().unwrap() = delay;
        self
    }

    pub fn set_reachable(&self, ip: &str, up: bool) {
        let mut reachable = self.state.reachable.lock().unwrap();
        if up {
            reachable.insert(ip.to_string());
        } else {
            reachable.remove(ip);
        }
    }

    /// IPs checkées, dans l'ordre de démarrage
    pub fn calls(&self) -> Vec<String> {
        self.state.calls.lock().unwrap().clone()
    }

    /// Pic de checks en vol simultanément
    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for StubProbe {
    async fn check(&self, ip: &str, timeout: Duration) -> bool {
        self.state.calls.lock().unwrap().push(ip.to_string());
        let now = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let hangs = self.state.hanging.lock().unwrap().contains(ip);
        let wait = if hangs {
            timeout + DEADLINE_GRACE
        } else {
            *self.state.delay.lock().unwrap()
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        let up = !hangs && self.state.reachable.lock().unwrap().contains(ip);
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
        up
    }
}
