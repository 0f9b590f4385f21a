mod trial_gate_tests;
