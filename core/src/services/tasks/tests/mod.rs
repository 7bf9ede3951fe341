mod distributor_tests;
