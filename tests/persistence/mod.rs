mod fit_result_io;
