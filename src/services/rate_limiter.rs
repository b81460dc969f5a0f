use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex as TokioMutex;
use tokio::time::{sleep, Instant};

const WINDOW: Duration = Duration::from_secs(60);

/// Sliding one-minute request budget shared by all concurrent calls of a fetch
#[derive(Debug)]
pub struct RateLimiter {
    /// Start times of requests inside the current window
    request_times: TokioMutex<VecDeque<Instant>>,
    /// Maximum requests allowed per minute
    rate_limit_per_minute: u32,
}

impl RateLimiter {
    pub fn new(rate_limit_per_minute: u32) -> Self {
        Self {
            request_times: TokioMutex::new(VecDeque::new()),
            rate_limit_per_minute: rate_limit_per_minute.max(1),
        }
    }

    /// Wait until a request slot is free, then claim it
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let now = Instant::now();
                let mut times = self.request_times.lock().await;

                while let Some(&oldest) = times.front() {
                    if now.duration_since(oldest) >= WINDOW {
                        times.pop_front();
                    } else {
                        break;
                    }
                }

                if times.len() < self.rate_limit_per_minute as usize {
                    times.push_back(now);
                    return;
                }

                // Lock is dropped before sleeping so other tasks can re-check
                match times.front() {
                    Some(&oldest) => WINDOW.saturating_sub(now.duration_since(oldest)),
                    None => Duration::ZERO,
                }
            };

            tracing::debug!(wait_ms = wait.as_millis() as u64, "Rate limit reached, waiting");
            sleep(wait + Duration::from_millis(50)).await;
        }
    }

    /// Requests counted in the current window
    #[cfg(test)]
    async fn in_flight_window(&self) -> usize {
        self.request_times.lock().await.len()
    }
}
