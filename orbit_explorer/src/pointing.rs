//! Best-effort pointing hardware output: look angles from a fixed observer
//! to the selected object, rate limited and sent as UDP JSON datagrams from
//! a dedicated thread.

use std::net::SocketAddr;
use std::thread;
use std::time::{Duration, Instant};

use bevy::log::{debug, info, warn};
use bevy::prelude::*;
use serde::Serialize;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use crate::interaction::SelectionState;
use crate::orbit::frame::{ecef_to_enu, geodetic_to_ecef, Geodetic};
use crate::pipeline::PositionBuffer;
use crate::scene::ExplorerSet;

pub const MIN_SEND_INTERVAL: Duration = Duration::from_millis(250);
const QUEUE_DEPTH: usize = 8;

pub const AZIMUTH_RANGE: (f64, f64) = (0.0, 180.0);
pub const ELEVATION_RANGE: (f64, f64) = (0.0, 90.0);

/// Azimuth/elevation in degrees, already clamped to the hardware range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LookAngles {
    #[serde(rename = "azimuth")]
    pub azimuth_deg: f64,
    #[serde(rename = "elevation")]
    pub elevation_deg: f64,
}

/// Topocentric angles from `observer` to `target`, both geodetic.
pub fn look_angles(observer: &Geodetic, target: &Geodetic) -> LookAngles {
    let delta = geodetic_to_ecef(target) - geodetic_to_ecef(observer);
    let enu = ecef_to_enu(delta, observer);
    let azimuth = enu.x.atan2(enu.y).to_degrees().rem_euclid(360.0);
    let elevation = enu.z.atan2(enu.x.hypot(enu.y)).to_degrees();
    LookAngles {
        azimuth_deg: azimuth.clamp(AZIMUTH_RANGE.0, AZIMUTH_RANGE.1),
        elevation_deg: elevation.clamp(ELEVATION_RANGE.0, ELEVATION_RANGE.1),
    }
}

/// Fixed observer location for look-angle computation.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct Observer(pub Geodetic);

/// Sending half of the pointing link. Every failure is swallowed.
#[derive(Resource, Debug)]
pub struct PointingClient {
    tx: mpsc::Sender<LookAngles>,
    min_interval: Duration,
    last_sent: Option<Instant>,
}

impl PointingClient {
    /// Spawn the UDP sender thread for `target`.
    pub fn spawn(target: SocketAddr) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(err) => {
                    warn!("pointing: failed to build tokio runtime: {err}");
                    return;
                }
            };
            rt.block_on(sender_loop(target, rx));
        });
        Self::with_sender(tx)
    }

    fn with_sender(tx: mpsc::Sender<LookAngles>) -> Self {
        Self {
            tx,
            min_interval: MIN_SEND_INTERVAL,
            last_sent: None,
        }
    }

    /// Queue `angles` unless the last send was under the minimum interval
    /// ago. Returns whether the angles were queued.
    pub fn offer(&mut self, angles: LookAngles, now: Instant) -> bool {
        if self
            .last_sent
            .is_some_and(|last| now.saturating_duration_since(last) < self.min_interval)
        {
            return false;
        }
        match self.tx.try_send(angles) {
            Ok(()) => {
                self.last_sent = Some(now);
                true
            }
            Err(err) => {
                debug!("pointing: dropped angles: {err}");
                false
            }
        }
    }
}

async fn sender_loop(target: SocketAddr, mut rx: mpsc::Receiver<LookAngles>) {
    let bind: SocketAddr = if target.is_ipv4() {
        ([0, 0, 0, 0], 0).into()
    } else {
        ([0u16; 8], 0).into()
    };
    let socket = match UdpSocket::bind(bind).await {
        Ok(socket) => socket,
        Err(err) => {
            warn!("pointing: failed to bind UDP socket: {err}");
            return;
        }
    };
    info!("pointing: sending look angles to {target}");

    while let Some(angles) = rx.recv().await {
        let datagram = match serde_json::to_vec(&angles) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!("pointing: encode error: {err}");
                continue;
            }
        };
        if let Err(err) = socket.send_to(&datagram, target).await {
            debug!("pointing: send error: {err}");
        }
    }
}

pub fn pointing_plugin(app: &mut App) {
    app.add_systems(Update, pointing_system.in_set(ExplorerSet::Sync));
}

fn pointing_system(
    client: Option<ResMut<PointingClient>>,
    observer: Option<Res<Observer>>,
    selection: Res<SelectionState>,
    buffer: Res<PositionBuffer>,
) {
    let (Some(mut client), Some(observer)) = (client, observer) else {
        return;
    };
    let Some(sample) = selection.selected.and_then(|id| buffer.get(id)) else {
        return;
    };
    client.offer(look_angles(&observer.0, &sample.geodetic), Instant::now());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(latitude_deg: f64, longitude_deg: f64, altitude_km: f64) -> Geodetic {
        Geodetic {
            latitude_deg,
            longitude_deg,
            altitude_km,
        }
    }

    #[test]
    fn overhead_object_is_at_zenith() {
        let angles = look_angles(&at(45.0, 10.0, 0.0), &at(45.0, 10.0, 400.0));
        assert!((angles.elevation_deg - 90.0).abs() < 1e-6);
    }

    #[test]
    fn cardinal_directions() {
        let observer = at(0.0, 0.0, 0.0);
        let north = look_angles(&observer, &at(5.0, 0.0, 800.0));
        assert!(north.azimuth_deg < 1e-6, "{north:?}");
        assert!(north.elevation_deg > 0.0);

        let east = look_angles(&observer, &at(0.0, 5.0, 800.0));
        assert!((east.azimuth_deg - 90.0).abs() < 1e-6, "{east:?}");
    }

    #[test]
    fn angles_are_clamped_into_hardware_range() {
        let observer = at(0.0, 0.0, 0.0);
        let west = look_angles(&observer, &at(0.0, -5.0, 800.0));
        assert_eq!(west.azimuth_deg, 180.0);

        let antipode = look_angles(&observer, &at(0.0, 180.0, 400.0));
        assert_eq!(antipode.elevation_deg, 0.0);
    }

    #[test]
    fn offers_are_rate_limited() {
        let (tx, mut rx) = mpsc::channel(QUEUE_DEPTH);
        let mut client = PointingClient::with_sender(tx);
        let angles = LookAngles {
            azimuth_deg: 10.0,
            elevation_deg: 20.0,
        };
        let start = Instant::now();

        assert!(client.offer(angles, start));
        assert!(!client.offer(angles, start + Duration::from_millis(100)));
        assert!(client.offer(angles, start + Duration::from_millis(250)));
        assert_eq!(rx.try_recv().unwrap(), angles);
        assert_eq!(rx.try_recv().unwrap(), angles);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn full_or_closed_queue_is_swallowed() {
        let (tx, rx) = mpsc::channel(1);
        let mut client = PointingClient::with_sender(tx);
        client.min_interval = Duration::ZERO;
        let angles = LookAngles {
            azimuth_deg: 0.0,
            elevation_deg: 0.0,
        };
        let now = Instant::now();
        assert!(client.offer(angles, now));
        assert!(!client.offer(angles, now));
        drop(rx);
        assert!(!client.offer(angles, now));
    }

    #[tokio::test]
    async fn sends_json_datagrams_over_udp() {
        let listener = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let target = listener.local_addr().unwrap();
        let mut client = PointingClient::spawn(target);

        assert!(client.offer(
            LookAngles {
                azimuth_deg: 123.5,
                elevation_deg: 45.0,
            },
            Instant::now(),
        ));

        let mut buf = [0u8; 256];
        let (len, _) = tokio::time::timeout(Duration::from_secs(5), listener.recv_from(&mut buf))
            .await
            .expect("datagram within timeout")
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf[..len]).unwrap();
        assert_eq!(value["azimuth"], 123.5);
        assert_eq!(value["elevation"], 45.0);
    }
}
