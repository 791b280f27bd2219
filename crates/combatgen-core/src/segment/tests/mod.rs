mod segmenter_tests;
