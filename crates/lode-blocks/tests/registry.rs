use lode_blocks::types::ids;
use lode_blocks::{MAX_LIGHT, MaterialTable};
use proptest::prelude::*;

#[test]
fn builtin_table_has_single_emitter() {
    let t = MaterialTable::builtin();
    assert_eq!(t.emission(ids::LIGHT), MAX_LIGHT);
    assert!(!t.is_emitter(ids::AIR));
    assert!(!t.is_emitter(ids::STONE));
    assert!(t.is_granular(ids::SAND));
    assert!(!t.is_granular(ids::STONE));
    assert_eq!(t.id_by_name("sand"), Some(ids::SAND));
    assert!(t.get(200).is_none());
}

#[test]
fn toml_overrides_and_extends_builtins() {
    let t = MaterialTable::from_toml_str(
        r#"
        [[materials]]
        name = "lamp"
        id = 2
        emission = 12

        [[materials]]
        name = "glowstone"
        id = 9
        emission = 200

        [[materials]]
        name = "nothing"
        id = 0
        emission = 5
    "#,
    )
    .unwrap();
    assert_eq!(t.emission(ids::LIGHT), 12);
    assert_eq!(t.id_by_name("lamp"), Some(ids::LIGHT));
    assert_eq!(t.id_by_name("light"), None);
    // Clamped to the light range
    assert_eq!(t.emission(9), MAX_LIGHT);
    // Air never emits
    assert_eq!(t.emission(ids::AIR), 0);
}

#[test]
fn malformed_toml_is_an_error() {
    assert!(MaterialTable::from_toml_str("[[materials]]\nname = 3").is_err());
}

proptest! {
    // Emission is always within the light range, whatever the config says
    #[test]
    fn emission_is_clamped(id in 1u8..=255, level in any::<u8>()) {
        let src = format!("[[materials]]\nname = \"m\"\nid = {id}\nemission = {level}\n");
        let t = MaterialTable::from_toml_str(&src).unwrap();
        prop_assert!(t.emission(id) <= MAX_LIGHT);
        prop_assert_eq!(t.is_emitter(id), level > 0);
    }
}
