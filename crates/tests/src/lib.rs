// Integration tests live in tests/; this crate exists to host them.
