mod provider_tests;
