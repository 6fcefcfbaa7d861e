//! End-to-end tests against real loopback sockets.

#![cfg(test)]

mod support;

mod discovery {
    mod integration;
}

mod scan {
    mod integration;
}
