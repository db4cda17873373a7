// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn resolves_to_a_non_empty_address_on_a_machine_with_a_working_resolver() {
    // `localhost` always resolves, unlike the real hostname in a sandboxed
    // test runner — this exercises the resolution path without asserting
    // on a specific address.
    let addrs: Vec<_> = ("localhost", 0).to_socket_addrs().unwrap().collect();
    assert!(!addrs.is_empty());
}
