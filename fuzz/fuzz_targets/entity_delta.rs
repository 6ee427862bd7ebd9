#![no_main]

use bitstream::MessageReader;
use codec::{
    read_entity_number, EntityDeltaCodec, EntityState, EntityUpdate, PlayerDeltaCodec,
    ProtocolVariant, ENTITYNUM_NONE,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&mode, message)) = data.split_first() else {
        return;
    };
    let variant = if mode & 1 == 0 {
        ProtocolVariant::Current
    } else {
        ProtocolVariant::Legacy
    };

    // Decode an entity list against a rolling baseline until the terminator.
    let codec = EntityDeltaCodec::new(variant);
    let mut baseline = EntityState::default();
    let mut reader = MessageReader::compressed(message);
    for _ in 0..256 {
        let Ok(number) = read_entity_number(&mut reader) else {
            break;
        };
        if number == ENTITYNUM_NONE {
            break;
        }
        match codec.read_delta(&mut reader, Some(&baseline), number) {
            Ok(EntityUpdate::Present(state)) => baseline = state,
            Ok(EntityUpdate::Removed) => {}
            Err(_) => break,
        }
    }

    let mut reader = MessageReader::compressed(message);
    let _ = PlayerDeltaCodec::new(variant).read_delta(&mut reader, None);
});
