//! Demo: drive the check-in core end-to-end against mock hardware.
//!
//! Simulates a read-mode tap for each known technology plus an unsupported
//! tag, then a write-mode flow: arm a check-in URI, present a writable tag,
//! and read the stored payload back. Verbosity follows `RUST_LOG`.

use anyhow::Result;
use rollcall_core::{Error, HardwareStatus, ReadOutcome, hex_bytes};
use rollcall_ndef::{ArmedWriter, NdefMessage, WriteRequest, check_in};
use rollcall_reader::{AnyAdapter, DiscoveryAction, MockAdapter, ReaderEngine, TapEvent};
use rollcall_tag::{AnyTag, MockTag, TagDevice, TechKind, TechProperties, UltralightKind};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Prints every notification the engine delivers.
struct ConsoleListener;

impl rollcall_reader::ReaderListener for ConsoleListener {
    fn on_status_changed(&self, status: HardwareStatus) {
        info!(%status, "hardware status");
    }

    fn on_tag_detected(&self, outcome: &ReadOutcome) {
        match serde_json::to_string(outcome) {
            Ok(json) => println!("{json}"),
            Err(err) => error!(%err, "unprintable outcome"),
        }
    }

    fn on_error(&self, err: &Error) {
        error!(%err, "platform error");
    }
}

fn demo_tags() -> Vec<AnyTag> {
    vec![
        AnyTag::Mock(
            MockTag::builder(vec![0x04, 0xA1, 0x3B, 0x92])
                .with_tech(TechKind::IsoDep)
                .transceive_response(vec![0x6F, 0x1A, 0x84, 0x07, 0x90, 0x00])
                .build(),
        ),
        AnyTag::Mock(
            MockTag::builder(vec![0x9C, 0x55, 0x01, 0x7F])
                .with_properties(TechProperties::MifareClassic { sector_count: 16 })
                .build(),
        ),
        AnyTag::Mock(
            MockTag::builder(vec![0x04, 0x22, 0x6D, 0x18])
                .with_properties(TechProperties::MifareUltralight {
                    kind: UltralightKind::UltralightC,
                })
                .build(),
        ),
        AnyTag::Mock(
            MockTag::builder(vec![0xE0, 0x04, 0x01, 0x50])
                .with_properties(TechProperties::NfcV {
                    dsf_id: 0,
                    response_flags: 0,
                })
                .build(),
        ),
        // No handler claims this one.
        AnyTag::Mock(
            MockTag::builder(vec![0x00, 0x00, 0x00, 0x01])
                .with_tech(TechKind::NfcBarcode)
                .build(),
        ),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let engine = ReaderEngine::new();
    engine.add_listener(Arc::new(ConsoleListener));
    engine.initialize(Some(AnyAdapter::Mock(MockAdapter::new(true))));
    engine.enable_capture();

    info!("simulating read-mode taps");
    for tag in demo_tags() {
        let event = TapEvent::new(DiscoveryAction::Tech, Some(tag));
        engine.read_tag(&event);
    }

    // Give background classifications time to fan out before write mode.
    tokio::time::sleep(Duration::from_millis(200)).await;

    info!("simulating write mode");
    let mut writer = ArmedWriter::default();
    writer.arm(WriteRequest::Uri(
        "https://rollcall.example/checkin?userId=42".to_string(),
    ));

    let blank = MockTag::builder(vec![0x04, 0x77, 0x10, 0x2A])
        .with_ndef(true, 256)
        .build();
    if let Some(outcome) = writer.on_tag(&blank).await {
        info!(success = outcome.success, message = %outcome.message, "write attempt");
    }

    // Read the stored payload back as a check-in.
    if let Some(written) = blank.written_message() {
        let message = NdefMessage::parse(&written)?;
        match check_in::user_id(&message) {
            Some(user_id) => info!(
                %user_id,
                tag = %hex_bytes(blank.uid()),
                "tag now checks in"
            ),
            None => error!("written payload carries no check-in id"),
        }
    }

    engine.disable_capture();
    engine.shutdown().await;
    Ok(())
}
