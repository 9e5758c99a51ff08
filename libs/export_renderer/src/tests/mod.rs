mod render_tests;
