mod exchange_test;
