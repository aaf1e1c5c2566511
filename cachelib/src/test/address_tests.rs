use crate::address::AddressDecoder;

#[test]
fn splits_address_into_set_and_block() {
    let decoder = AddressDecoder::new(1024, 64);
    assert_eq!(decoder.block_shift(), 6);
    assert_eq!(decoder.tag(0x1000), 0x40);
    assert_eq!(decoder.set_index(0x1000), 0x40);
    // Index bits stay in the tag, upper bits don't reach the index
    assert_eq!(decoder.set_and_tag(0x1234_5678), (0x159, 0x48_d159));
}

#[test]
fn aligns_and_rebuilds_block_addresses() {
    let decoder = AddressDecoder::new(16, 32);
    assert_eq!(decoder.align(0x103f), 0x1020);
    assert_eq!(decoder.align(0x1020), 0x1020);
    assert_eq!(decoder.block_address(decoder.tag(0x103f)), 0x1020);
    assert_eq!(decoder.align(u64::MAX), u64::MAX - 31);
}

#[test]
fn single_set_maps_everything_to_set_zero() {
    let decoder = AddressDecoder::new(1, 8);
    assert_eq!(decoder.set_index(0xdead_beef), 0);
    assert_eq!(decoder.tag(0xdead_beef), 0xdead_beef >> 3);
}
