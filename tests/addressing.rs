//! Addressing override resolution: explicit values land on the sealed
//! definition, blank values read as not set.

mod common;

use endpoint_core::endpoint::LocalEndpoint;

use common::endpoint_config;

#[test]
fn overriding_local_address_sets_desired_value() {
    let source = endpoint_config(&[("LocalAddressOverride", "local-address-override")]);

    let mut endpoint = LocalEndpoint::with_config("my-endpoint", source).unwrap();
    let definition = endpoint.finalize().unwrap();

    assert_eq!(
        definition.addressing.local_address.as_deref(),
        Some("local-address-override")
    );
}

#[test]
fn overriding_public_return_address_sets_desired_value() {
    let source = endpoint_config(&[("PublicReturnAddressOverride", "return-address-override")]);

    let mut endpoint = LocalEndpoint::with_config("my-endpoint", source).unwrap();
    let definition = endpoint.finalize().unwrap();

    assert_eq!(
        definition.addressing.public_return_address.as_deref(),
        Some("return-address-override")
    );
}

#[test]
fn setting_instance_discriminator_sets_desired_value() {
    let source = endpoint_config(&[("EndpointInstanceDiscriminator", "A")]);

    let mut endpoint = LocalEndpoint::with_config("my-endpoint", source).unwrap();
    let definition = endpoint.finalize().unwrap();

    assert_eq!(
        definition.addressing.instance_discriminator.as_deref(),
        Some("A")
    );
}

#[test]
fn blank_overrides_are_treated_as_not_set() {
    let source = endpoint_config(&[
        ("LocalAddressOverride", ""),
        ("PublicReturnAddressOverride", "   "),
    ]);

    let mut endpoint = LocalEndpoint::with_config("my-endpoint", source).unwrap();
    let definition = endpoint.finalize().unwrap();

    assert_eq!(definition.addressing.local_address, None);
    assert_eq!(definition.addressing.public_return_address, None);
    assert_eq!(definition.addressing.instance_discriminator, None);
}
