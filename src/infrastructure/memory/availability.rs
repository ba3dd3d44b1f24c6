//! Availability Monitor - 推理服务可用性监视器
//!
//! 快照只由探测循环整体替换；刷新请求经由窄接口进入循环，
//! 已有探测在进行中时直接丢弃。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::application::ports::{AvailabilityPort, AvailabilitySnapshot, InferenceEnginePort};

/// 监视器配置
#[derive(Debug, Clone)]
pub struct AvailabilityMonitorConfig {
    /// 周期探测间隔（秒），0 表示只在启动和手动刷新时探测
    pub probe_interval_secs: u64,
    /// 需要安装的模型
    pub required_models: Vec<String>,
}

impl Default for AvailabilityMonitorConfig {
    fn default() -> Self {
        Self {
            probe_interval_secs: 60,
            required_models: Vec::new(),
        }
    }
}

struct Shared {
    engine: Arc<dyn InferenceEnginePort>,
    required_models: Vec<String>,
    state: watch::Sender<AvailabilitySnapshot>,
    in_flight: AtomicBool,
}

impl Shared {
    fn try_begin(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    async fn probe(&self) {
        self.state.send_replace(AvailabilitySnapshot::checking());

        let available = self.engine.probe_availability().await;
        let models = if available {
            self.engine.list_models().await
        } else {
            Vec::new()
        };

        let snapshot = AvailabilitySnapshot::from_probe(available, models, &self.required_models);
        if snapshot.is_available() {
            tracing::info!(
                models = snapshot.models.len(),
                missing = ?snapshot.missing_models,
                "Inference service available"
            );
        } else {
            tracing::warn!("Inference service unavailable");
        }

        self.state.send_replace(snapshot);
        self.in_flight.store(false, Ordering::Release);
    }
}

/// 可用性监视器（读 + 刷新句柄）
pub struct AvailabilityMonitor {
    shared: Arc<Shared>,
    requests: mpsc::Sender<()>,
}

/// 探测循环，由调用方 spawn
pub struct AvailabilityProbeLoop {
    shared: Arc<Shared>,
    requests: mpsc::Receiver<()>,
    interval: Option<Duration>,
}

impl AvailabilityMonitor {
    pub fn new(
        config: AvailabilityMonitorConfig,
        engine: Arc<dyn InferenceEnginePort>,
    ) -> (Self, AvailabilityProbeLoop) {
        let (state, _) = watch::channel(AvailabilitySnapshot::checking());
        let (tx, rx) = mpsc::channel(1);

        let shared = Arc::new(Shared {
            engine,
            required_models: config.required_models,
            state,
            in_flight: AtomicBool::new(false),
        });

        let interval = match config.probe_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        (
            Self {
                shared: shared.clone(),
                requests: tx,
            },
            AvailabilityProbeLoop {
                shared,
                requests: rx,
                interval,
            },
        )
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl AvailabilityPort for AvailabilityMonitor {
    fn snapshot(&self) -> AvailabilitySnapshot {
        self.shared.state.borrow().clone()
    }

    fn request_probe(&self) -> bool {
        if !self.shared.try_begin() {
            tracing::debug!("Probe already in flight, request dropped");
            return false;
        }

        if self.requests.try_send(()).is_err() {
            self.shared.in_flight.store(false, Ordering::Release);
            tracing::warn!("Probe loop not running, request dropped");
            return false;
        }

        true
    }

    fn subscribe(&self) -> watch::Receiver<AvailabilitySnapshot> {
        self.shared.state.subscribe()
    }
}

impl AvailabilityProbeLoop {
    /// 启动后立即探测一次，之后按固定间隔探测，错过的周期直接跳过
    pub async fn run(mut self) {
        tracing::info!(
            interval_secs = self.interval.map(|d| d.as_secs()),
            "Availability monitor started"
        );

        let Some(period) = self.interval else {
            if self.shared.try_begin() {
                self.shared.probe().await;
            }
            while self.requests.recv().await.is_some() {
                self.shared.probe().await;
            }
            tracing::info!("Availability monitor stopped");
            return;
        };

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.shared.try_begin() {
                        self.shared.probe().await;
                    }
                }
                request = self.requests.recv() => match request {
                    Some(()) => self.shared.probe().await,
                    None => break,
                },
            }
        }

        tracing::info!("Availability monitor stopped");
    }
}
