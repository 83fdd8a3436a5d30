use base64::{URL_SAFE_NO_PAD, encode_config};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::ports::store::KeyValueStore;

pub(crate) const CLIENT_ID_KEY: &str = "client-id";

/// Returns the installation's client id, minting and persisting one on
/// first use. An existing non-empty value is returned unchanged; the id is
/// never regenerated while the store holds valid data. Store failure is the
/// only error and is fatal to everything downstream.
pub fn get_or_create_client_id<S: KeyValueStore>(store: &S) -> Result<String, S::Error> {
    let mut rng = OsRng;
    get_or_create_client_id_with_rng(store, &mut rng)
}

pub(crate) fn get_or_create_client_id_with_rng<S, R>(
    store: &S,
    rng: &mut R,
) -> Result<String, S::Error>
where
    S: KeyValueStore,
    R: RngCore + CryptoRng,
{
    if let Some(existing) = store.get(CLIENT_ID_KEY)?
        && !existing.is_empty()
    {
        return Ok(existing);
    }

    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    let client_id = encode_config(bytes, URL_SAFE_NO_PAD);
    store.set(CLIENT_ID_KEY, &client_id)?;
    Ok(client_id)
}
