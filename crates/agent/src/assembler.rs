//! Prompt assembly.
//!
//! Each completion request is rebuilt from scratch: persona and knowledge
//! preamble, a vehicle block when the session has a resolved record, then
//! the most recent window of conversation messages. Nothing about earlier
//! prompts is cached, so a vehicle resolved mid-conversation shows up in
//! the very next request.

use std::fmt::Write;

use rekkari_core::message::Message;
use rekkari_core::provider::CompletionRequest;
use rekkari_core::vehicle::{DataSource, VehicleRecord};
use rekkari_config::{ProviderConfig, SessionConfig};

use crate::knowledge::{common_issues, PRICE_LIST};

const PERSONA: &str = "\
Olet suomalaisen autokorjaamon ystävällinen ja asiantunteva huoltoneuvoja. \
Vastaat aina suomeksi, selkeästi ja käytännönläheisesti. Kerrot rehellisesti \
mitä viat tyypillisesti maksavat ja milloin korjaus kannattaa. Et koskaan \
keksi hintoja hinnaston ulkopuolelta; jos et tiedä, sanot sen suoraan ja \
ehdotat vianmääritystä.";

/// Render the system prompt for the current session state.
pub fn system_prompt(vehicle: Option<&VehicleRecord>) -> String {
    let mut prompt = String::from(PERSONA);

    prompt.push_str("\n\nHinnasto:\n");
    for (service, price) in PRICE_LIST {
        let _ = writeln!(prompt, "- {service}: {price}");
    }

    if let Some(vehicle) = vehicle.filter(|v| v.found) {
        prompt.push_str("\nAsiakkaan auto:\n");
        let _ = writeln!(prompt, "- Rekisterinumero: {}", vehicle.registration_number);
        let _ = writeln!(prompt, "- Merkki ja malli: {} {}", vehicle.make, vehicle.model);
        if !vehicle.year.is_empty() {
            let _ = writeln!(prompt, "- Vuosimalli: {}", vehicle.year);
        }
        if !vehicle.generation.is_empty() {
            let _ = writeln!(prompt, "- Korimalli: {}", vehicle.generation);
        }
        if !vehicle.vin.is_empty() {
            let _ = writeln!(prompt, "- Valmistenumero: {}", vehicle.vin);
        }
        if vehicle.data_source == DataSource::Demo {
            prompt.push_str(
                "(Huom: ajoneuvon tiedot ovat esimerkkitietoja, koska hakua ei voitu tehdä.)\n",
            );
        }

        prompt.push_str("\nTämän mallin tyypilliset viat:\n");
        for issue in common_issues(&vehicle.generation) {
            let _ = writeln!(prompt, "- {issue}");
        }
    }

    prompt
}

/// Assemble the completion request for one chat turn.
///
/// `messages` is the session's full ordered sequence; only the most recent
/// `session.message_window` entries are sent.
pub fn assemble_request(
    provider: &ProviderConfig,
    session: &SessionConfig,
    vehicle: Option<&VehicleRecord>,
    messages: &[Message],
) -> CompletionRequest {
    let start = messages.len().saturating_sub(session.message_window);
    let mut prompt_messages = Vec::with_capacity(1 + messages.len() - start);
    prompt_messages.push(Message::system(system_prompt(vehicle)));
    prompt_messages.extend_from_slice(&messages[start..]);

    CompletionRequest {
        model: provider.model.clone(),
        messages: prompt_messages,
        temperature: provider.temperature,
        max_tokens: provider.max_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rekkari_core::message::Role;

    fn vehicle() -> VehicleRecord {
        VehicleRecord {
            registration_number: "ABC123".into(),
            make: "BMW".into(),
            model: "3 Series 320i".into(),
            year: "2010".into(),
            generation: "E90".into(),
            vin: "WBAVA12345".into(),
            found: true,
            data_source: DataSource::Resolved,
        }
    }

    #[test]
    fn prompt_without_vehicle_has_persona_and_prices() {
        let prompt = system_prompt(None);
        assert!(prompt.contains("huoltoneuvoja"));
        assert!(prompt.contains("Öljynvaihto"));
        assert!(!prompt.contains("Asiakkaan auto"));
    }

    #[test]
    fn prompt_with_vehicle_includes_identity_and_issues() {
        let prompt = system_prompt(Some(&vehicle()));
        assert!(prompt.contains("BMW 3 Series 320i"));
        assert!(prompt.contains("E90"));
        assert!(prompt.contains("VANOS"));
        assert!(prompt.contains("WBAVA12345"));
    }

    #[test]
    fn unfound_vehicle_is_omitted() {
        let record = VehicleRecord::not_found("ABC123");
        let prompt = system_prompt(Some(&record));
        assert!(!prompt.contains("Asiakkaan auto"));
    }

    #[test]
    fn demo_vehicle_is_disclaimed() {
        let mut record = vehicle();
        record.data_source = DataSource::Demo;
        let prompt = system_prompt(Some(&record));
        assert!(prompt.contains("esimerkkitietoja"));
    }

    #[test]
    fn request_windows_messages_and_leads_with_system() {
        let messages: Vec<Message> = (0..15)
            .map(|i| Message::user(format!("viesti {i}")))
            .collect();
        let request = assemble_request(
            &ProviderConfig::default(),
            &SessionConfig::default(),
            Some(&vehicle()),
            &messages,
        );

        assert_eq!(request.messages.len(), 11);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].content, "viesti 5");
        assert_eq!(request.messages[10].content, "viesti 14");
        assert_eq!(request.model, "gpt-4o-mini");
    }
}
