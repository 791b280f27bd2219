mod optimizer_tests;
