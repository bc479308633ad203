mod history_tests;
