mod bridge_protocol_tests;
