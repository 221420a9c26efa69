//! Fixed-priority technology handler chain.
//!
//! Classification walks an ordered list of per-technology handlers; the
//! first handler whose technology the tag advertises owns the read. Each
//! handler runs a scoped connect-probe-close sequence and converts every
//! session failure into a failed outcome locally, so a malformed tag can
//! never take down the delivery pipeline.

use rollcall_core::constants::SELECT_NDEF_APPLICATION;
use rollcall_core::{ReadOutcome, hex_bytes};
use rollcall_tag::{TagDevice, TagError, TechKind, TechProperties};
use tracing::warn;

/// Handler priority: specific protocols before generic ones, so a handle
/// advertising several technology names lands on the most specific handler.
pub const HANDLER_PRIORITY: [TechKind; 7] = [
    TechKind::IsoDep,
    TechKind::MifareClassic,
    TechKind::MifareUltralight,
    TechKind::NfcA,
    TechKind::NfcB,
    TechKind::NfcF,
    TechKind::NfcV,
];

/// Classify a tag handle and produce its read outcome.
///
/// Exactly one handler runs per call. A tag advertising none of the known
/// technologies yields a failed outcome naming its technology list.
pub async fn classify<T: TagDevice>(tag: &T) -> ReadOutcome {
    for tech in HANDLER_PRIORITY {
        if tag.has_tech(tech) {
            return handle(tag, tech).await;
        }
    }
    let names = tag
        .tech_list()
        .iter()
        .map(TechKind::name)
        .collect::<Vec<_>>()
        .join(", ");
    ReadOutcome::failure(format!("unsupported technology: {names}"))
}

/// Technology name as reported in outcomes and failure messages.
fn reported_name(tech: TechKind) -> &'static str {
    match tech {
        TechKind::IsoDep => "ISO-DEP",
        TechKind::MifareClassic => "Mifare Classic",
        TechKind::MifareUltralight => "Mifare Ultralight",
        TechKind::NfcA => "NFC-A",
        TechKind::NfcB => "NFC-B",
        TechKind::NfcF => "NFC-F",
        TechKind::NfcV => "NFC-V",
        other => other.name(),
    }
}

/// What a successful probe recovered from the tag.
struct Probe {
    tag_type: String,
    data: Option<String>,
}

async fn handle<T: TagDevice>(tag: &T, tech: TechKind) -> ReadOutcome {
    match probe(tag, tech).await {
        Ok(probe) => ReadOutcome::success(hex_bytes(tag.uid()), probe.tag_type, probe.data),
        Err(error) => ReadOutcome::failure(format!(
            "failed to read {} tag: {error}",
            reported_name(tech)
        )),
    }
}

/// Scoped session acquisition: once `connect` succeeds, the session is
/// closed exactly once on every exit path. A failing close is logged and
/// never masks the probe result.
async fn probe<T: TagDevice>(tag: &T, tech: TechKind) -> rollcall_tag::Result<Probe> {
    tag.connect(tech).await?;
    let result = match tech {
        TechKind::IsoDep => probe_iso_dep(tag).await,
        _ => probe_attributes(tag, tech).await,
    };
    if let Err(error) = tag.close(tech).await {
        warn!(%tech, %error, "failed to close tag session");
    }
    result
}

/// Minimal ISO-DEP probe: select the NDEF application and report the raw
/// response.
async fn probe_iso_dep<T: TagDevice>(tag: &T) -> rollcall_tag::Result<Probe> {
    let response = tag
        .transceive(TechKind::IsoDep, &SELECT_NDEF_APPLICATION)
        .await?;
    Ok(Probe {
        tag_type: "ISO-DEP".to_string(),
        data: Some(hex_bytes(&response)),
    })
}

/// Attribute-based probe for the remaining technologies.
async fn probe_attributes<T: TagDevice>(tag: &T, tech: TechKind) -> rollcall_tag::Result<Probe> {
    let probe = match tag.properties(tech).await? {
        TechProperties::MifareClassic { sector_count } => Probe {
            tag_type: "Mifare Classic".to_string(),
            data: Some(format!("Sectors: {sector_count}")),
        },
        TechProperties::MifareUltralight { kind } => Probe {
            tag_type: format!("Mifare Ultralight ({})", kind.name()),
            data: None,
        },
        TechProperties::NfcA { atqa, sak } => Probe {
            tag_type: "NFC-A".to_string(),
            data: Some(format!("ATQA: {}, SAK: {sak}", hex_bytes(&atqa))),
        },
        TechProperties::NfcB {
            application_data,
            protocol_info,
        } => Probe {
            tag_type: "NFC-B".to_string(),
            data: Some(format!(
                "Application Data: {}, Protocol Info: {}",
                hex_bytes(&application_data),
                hex_bytes(&protocol_info)
            )),
        },
        TechProperties::NfcF {
            manufacturer,
            system_code,
        } => Probe {
            tag_type: "NFC-F".to_string(),
            data: Some(format!(
                "Manufacturer: {}, System Code: {}",
                hex_bytes(&manufacturer),
                hex_bytes(&system_code)
            )),
        },
        TechProperties::NfcV {
            dsf_id,
            response_flags,
        } => Probe {
            tag_type: "NFC-V".to_string(),
            data: Some(format!(
                "DSF ID: {dsf_id}, Response Flags: {response_flags}"
            )),
        },
        other => {
            return Err(TagError::transceive(format!(
                "unexpected {tech} attributes: {other:?}"
            )));
        }
    };
    Ok(probe)
}
